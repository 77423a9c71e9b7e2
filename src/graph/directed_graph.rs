use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::{
    algo::{is_cyclic_directed, toposort},
    graph::NodeIndex,
    Directed, Graph,
};
use serde::Serialize;

/**
Adjacency-list graph handle keyed by node/edge id strings.

The extractor and the folding engine both need "which edges touch this node,
and in which direction" far more than they need real graph algorithms, and
folding removes vertices, which petgraph's `Graph` doesn't really like (that's
why `StableGraph` exists).  So the authoritative representation is a pair of
ordered maps that we own outright, and we only materialize a petgraph `Graph`
on demand for the traversal questions (cycles, topological order) that
hierarchy-style consumers ask.

Ordered maps keep iteration deterministic, which keeps test expectations and
any derived petgraph indices stable.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectedGraph {
    vertices: BTreeMap<String, Adjacency>,
    /// Edge id to (from, to).
    edges: BTreeMap<String, (String, String)>,
}

/// Ids of the edges entering and leaving a vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjacency {
    pub incoming: BTreeSet<String>,
    pub outgoing: BTreeSet<String>,
}

/// Which way an edge runs relative to the vertex we're looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: &str) {
        if !self.vertices.contains_key(id) {
            self.vertices.insert(id.to_string(), Adjacency::default());
        }
    }

    /// Add (or re-point) the edge with the given id, creating the endpoints if
    /// they don't exist yet.
    pub fn add_edge(&mut self, edge_id: &str, from: &str, to: &str) {
        self.remove_edge(edge_id);
        self.add_node(from);
        self.add_node(to);
        if let Some(adj) = self.vertices.get_mut(from) {
            adj.outgoing.insert(edge_id.to_string());
        }
        if let Some(adj) = self.vertices.get_mut(to) {
            adj.incoming.insert(edge_id.to_string());
        }
        self.edges
            .insert(edge_id.to_string(), (from.to_string(), to.to_string()));
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        let (from, to) = match self.edges.remove(edge_id) {
            Some(endpoints) => endpoints,
            None => return false,
        };
        if let Some(adj) = self.vertices.get_mut(&from) {
            adj.outgoing.remove(edge_id);
        }
        if let Some(adj) = self.vertices.get_mut(&to) {
            adj.incoming.remove(edge_id);
        }
        true
    }

    /// Remove a vertex and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let adj = match self.vertices.remove(id) {
            Some(adj) => adj,
            None => return false,
        };
        for edge_id in adj.incoming.iter().chain(adj.outgoing.iter()) {
            self.remove_edge(edge_id);
        }
        true
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn contains_edge(&self, edge_id: &str) -> bool {
        self.edges.contains_key(edge_id)
    }

    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.vertices.keys().map(|k| k.as_str())
    }

    pub fn adjacency(&self, id: &str) -> Option<&Adjacency> {
        self.vertices.get(id)
    }

    pub fn endpoints(&self, edge_id: &str) -> Option<(&str, &str)> {
        self.edges
            .get(edge_id)
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    pub fn successors(&self, id: &str) -> Vec<&str> {
        match self.vertices.get(id) {
            Some(adj) => adj
                .outgoing
                .iter()
                .filter_map(|e| self.endpoints(e).map(|(_, to)| to))
                .collect(),
            None => vec![],
        }
    }

    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        match self.vertices.get(id) {
            Some(adj) => adj
                .incoming
                .iter()
                .filter_map(|e| self.endpoints(e).map(|(from, _)| from))
                .collect(),
            None => vec![],
        }
    }

    /// The sorted multiset of (other endpoint, direction) pairs across every
    /// edge touching `id`.  Two vertices with equal signatures are
    /// indistinguishable by their connectivity.
    pub fn connection_signature(&self, id: &str) -> Vec<(String, Direction)> {
        let mut signature: Vec<(String, Direction)> = self
            .predecessors(id)
            .into_iter()
            .map(|from| (from.to_string(), Direction::Incoming))
            .chain(
                self.successors(id)
                    .into_iter()
                    .map(|to| (to.to_string(), Direction::Outgoing)),
            )
            .collect();
        signature.sort();
        signature
    }

    /// Materialize a petgraph `Graph` whose node weights are our ids and whose
    /// edge weights are our edge ids, along with the id-to-index mapping.
    pub fn to_petgraph(&self) -> (Graph<String, String, Directed>, HashMap<String, NodeIndex>) {
        let mut graph = Graph::new();
        let mut id_to_ix = HashMap::new();
        for id in self.vertices.keys() {
            let ix = graph.add_node(id.clone());
            id_to_ix.insert(id.clone(), ix);
        }
        for (edge_id, (from, to)) in self.edges.iter() {
            if let (Some(&from_ix), Some(&to_ix)) = (id_to_ix.get(from), id_to_ix.get(to)) {
                graph.add_edge(from_ix, to_ix, edge_id.clone());
            }
        }
        (graph, id_to_ix)
    }

    pub fn is_acyclic(&self) -> bool {
        let (graph, _) = self.to_petgraph();
        !is_cyclic_directed(&graph)
    }

    /// Vertex ids in a topological order, or None if there's a cycle.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        let (graph, _) = self.to_petgraph();
        let order = toposort(&graph, None).ok()?;
        Some(order.into_iter().map(|ix| graph[ix].clone()).collect())
    }
}
