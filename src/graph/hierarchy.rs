use std::collections::HashMap;

use serde::Serialize;

use super::types::NodesAndEdges;
use crate::errors::{DashboardError, Result};

/// Upper bound on the number of tree nodes `build_tree` will produce.  Shared
/// descendants are repeated under every parent, so stacked diamonds double the
/// size of the output with every layer.
pub const MAX_TREE_NODES: usize = 100_000;

/// A nested node for tree/hierarchy panels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub depth: Option<i64>,
    pub symbol: Option<String>,
    #[serde(rename = "isFolded")]
    pub is_folded: bool,
    pub children: Vec<TreeNode>,
}

/// Turn the node/edge model into one tree per root node, following outgoing
/// edges in edge order.  A node with several parents shows up under each of
/// them.  Roots are listed in node discovery order.
///
/// Hierarchies can't express cycles, so a cyclic graph is a `BadInput` error,
/// as is a graph that would expand to more than `MAX_TREE_NODES` tree nodes.
pub fn build_tree(ne: &NodesAndEdges) -> Result<Vec<TreeNode>> {
    build_tree_with_limit(ne, MAX_TREE_NODES)
}

pub fn build_tree_with_limit(ne: &NodesAndEdges, max_nodes: usize) -> Result<Vec<TreeNode>> {
    let span = trace_span!("build_tree", max_nodes);
    let _span_guard = span.enter();

    if !ne.graph.is_acyclic() {
        return Err(DashboardError::bad_input("hierarchy data contains a cycle"));
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in ne.edges.iter() {
        children
            .entry(edge.from_id.as_str())
            .or_insert_with(Vec::new)
            .push(edge.to_id.as_str());
    }

    let mut expander = TreeExpander {
        ne,
        children,
        remaining: max_nodes,
    };
    let mut trees = vec![];
    for node in ne.nodes.iter().filter(|n| ne.is_root(&n.id)) {
        trees.push(expander.expand(&node.id)?);
    }
    trace!(trees = trees.len(), expanded = max_nodes - expander.remaining);
    Ok(trees)
}

struct TreeExpander<'a> {
    ne: &'a NodesAndEdges,
    children: HashMap<&'a str, Vec<&'a str>>,
    remaining: usize,
}

impl<'a> TreeExpander<'a> {
    fn expand(&mut self, id: &str) -> Result<TreeNode> {
        if self.remaining == 0 {
            warn!("hierarchy expansion limit reached");
            return Err(DashboardError::bad_input(
                "hierarchy data expands to too many tree nodes",
            ));
        }
        self.remaining -= 1;

        let kids: Vec<&'a str> = self.children.get(id).cloned().unwrap_or_default();
        let mut expanded = Vec::with_capacity(kids.len());
        for kid in kids {
            expanded.push(self.expand(kid)?);
        }

        let node = self.ne.node(id);
        Ok(TreeNode {
            id: id.to_string(),
            title: node.and_then(|n| n.title.clone()),
            category: node.and_then(|n| n.category.clone()),
            depth: node.and_then(|n| n.depth),
            symbol: node.and_then(|n| n.symbol.clone()),
            is_folded: node.map_or(false, |n| n.is_folded),
            children: expanded,
        })
    }
}
