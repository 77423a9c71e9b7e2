use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{ser::SerializeStruct, Serialize, Serializer};

use super::directed_graph::DirectedGraph;
use crate::file_format::{config::FoldConfig, tabular::Row};

/// A vertex of the node/edge model handed to graph, flow and hierarchy panels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub depth: Option<i64>,
    /// The row that defined the node; None for implicit and folded nodes.
    pub row_data: Option<Row>,
    pub href: Option<String>,
    pub symbol: Option<String>,
    #[serde(rename = "isFolded")]
    pub is_folded: bool,
    #[serde(rename = "foldedNodes", skip_serializing_if = "Option::is_none")]
    pub folded_nodes: Option<Vec<FoldedNodeRef>>,
}

impl Node {
    /// A node created only because an edge referenced it.
    pub fn implicit(id: &str) -> Self {
        Node {
            id: id.to_string(),
            title: None,
            category: None,
            depth: None,
            row_data: None,
            href: None,
            symbol: None,
            is_folded: false,
            folded_nodes: None,
        }
    }
}

/// What a folded node remembers about each node it replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FoldedNodeRef {
    pub id: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub row_data: Option<Row>,
    #[serde(rename = "isFolded")]
    pub is_folded: bool,
}

impl Edge {
    /// Edge identity is the underscore join of the literal endpoint ids.
    pub fn make_id(from_id: &str, to_id: &str) -> String {
        format!("{}_{}", from_id, to_id)
    }
}

/// A category that appeared in the data, with its resolved color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fold: Option<FoldConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GraphMetadata {
    pub has_multiple_roots: bool,
    pub contains_duplicate_edges: bool,
}

/// A row the extractor had to skip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row_index: usize,
    pub message: String,
}

/// The aggregate produced by the extractor and transformed by folding.
///
/// `nodes` and `edges` hold the data in discovery order; everything else is
/// an index over them by id.  The lookups are private so that only the
/// extractor and the folding engine can keep them in sync.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodesAndEdges {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub(crate) node_lookup: HashMap<String, usize>,
    pub(crate) edge_lookup: HashMap<String, usize>,
    pub(crate) root_node_ids: BTreeSet<String>,
    /// Category name to member node ids, in node discovery order.
    pub(crate) node_category_map: BTreeMap<String, Vec<String>>,
    pub categories: BTreeMap<String, Category>,
    pub metadata: GraphMetadata,
    pub next_color_index: usize,
    pub row_errors: Vec<RowError>,
    pub graph: DirectedGraph,
}

impl NodesAndEdges {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_lookup.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_lookup.get(id).and_then(|&i| self.edges.get(i))
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.root_node_ids.contains(id)
    }

    pub fn root_node_ids(&self) -> impl Iterator<Item = &str> {
        self.root_node_ids.iter().map(|id| id.as_str())
    }

    pub fn root_nodes(&self) -> Vec<&Node> {
        self.root_node_ids
            .iter()
            .filter_map(|id| self.node(id))
            .collect()
    }

    pub fn category_node_ids(&self, category: &str) -> &[String] {
        match self.node_category_map.get(category) {
            Some(ids) => ids,
            None => &[],
        }
    }

    pub fn category_nodes(&self, category: &str) -> Vec<&Node> {
        self.category_node_ids(category)
            .iter()
            .filter_map(|id| self.node(id))
            .collect()
    }

    /// Recompute the id lookups after `nodes`/`edges` have been rewritten.
    pub(crate) fn rebuild_lookups(&mut self) {
        self.node_lookup = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        self.edge_lookup = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
    }

    /// Recompute the graph handle from `nodes`/`edges`.
    pub(crate) fn rebuild_graph(&mut self) {
        let mut graph = DirectedGraph::new();
        for node in self.nodes.iter() {
            graph.add_node(&node.id);
        }
        for edge in self.edges.iter() {
            graph.add_edge(&edge.id, &edge.from_id, &edge.to_id);
        }
        self.graph = graph;
    }
}

/// The id-keyed lookups are expressed as id lists rather than duplicating the
/// node objects, which keeps snapshots readable.
impl Serialize for NodesAndEdges {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("NodesAndEdges", 8)?;
        s.serialize_field("nodes", &self.nodes)?;
        s.serialize_field("edges", &self.edges)?;
        s.serialize_field("root_nodes", &self.root_node_ids)?;
        s.serialize_field("node_category_map", &self.node_category_map)?;
        s.serialize_field("categories", &self.categories)?;
        s.serialize_field("metadata", &self.metadata)?;
        s.serialize_field("next_color_index", &self.next_color_index)?;
        s.serialize_field("row_errors", &self.row_errors)?;
        s.end()
    }
}
