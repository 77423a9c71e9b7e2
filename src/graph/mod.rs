//! Node/edge modelling for graph, flow and hierarchy panels.
//!
//! The flow is: tabular result -> `build_nodes_and_edges` -> (optionally)
//! `fold_nodes_and_edges` -> the rendering layer, or on to `build_tree` for
//! hierarchy panels.  Each step produces a fresh `NodesAndEdges`.

pub mod directed_graph;
pub mod extract;
pub mod fold;
pub mod hierarchy;
pub mod types;

pub use directed_graph::{Direction, DirectedGraph};
pub use extract::build_nodes_and_edges;
pub use fold::fold_nodes_and_edges;
pub use hierarchy::{build_tree, build_tree_with_limit, TreeNode, MAX_TREE_NODES};
pub use types::{Category, Edge, FoldedNodeRef, GraphMetadata, Node, NodesAndEdges, RowError};
