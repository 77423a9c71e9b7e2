use std::collections::HashMap;

use itertools::Itertools;

use super::directed_graph::Direction;
use super::types::{Edge, FoldedNodeRef, Node, NodesAndEdges};

/// Collapse same-category nodes with identical connectivity into synthetic
/// folded nodes, for every category whose config carries a fold threshold
/// greater than 1.
///
/// Within a category, nodes are grouped by their connection signature: the
/// multiset of (other endpoint, direction) pairs over every edge touching
/// them.  Each group with at least `threshold` members is replaced by a node
/// `fold-<category>-<n>` (numbered from 1 per category in order of each
/// group's first member) that lists the members in `foldedNodes`.  Edges are
/// re-pointed at the folded node and edges that become parallel are merged
/// into a single untitled folded edge.
///
/// Categories are processed in name order, each one seeing the graph as
/// rewritten by the ones before it.  The input is not modified; `metadata`
/// and `next_color_index` are carried through as-is.
pub fn fold_nodes_and_edges(input: &NodesAndEdges) -> NodesAndEdges {
    let span = trace_span!("fold_nodes_and_edges");
    let _span_guard = span.enter();

    let mut result = input.clone();

    let foldable: Vec<(String, usize, Option<String>)> = input
        .categories
        .iter()
        .filter_map(|(name, category)| {
            let fold = category.fold.as_ref()?;
            let threshold = fold.effective_threshold()?;
            Some((name.clone(), threshold, fold.icon.clone()))
        })
        .collect();

    for (category, threshold, icon) in foldable {
        fold_category(&mut result, &category, threshold, icon);
    }

    result
}

/// A set of same-category nodes that share a connection signature.
struct FoldGroup {
    fold_id: String,
    members: Vec<FoldedNodeRef>,
}

fn fold_category(ne: &mut NodesAndEdges, category: &str, threshold: usize, icon: Option<String>) {
    let span = trace_span!("fold_category", category, threshold);
    let _span_guard = span.enter();

    // Group members by signature, keeping groups in order of first member.
    let mut group_index: HashMap<Vec<(String, Direction)>, usize> = HashMap::new();
    let mut candidate_groups: Vec<Vec<&Node>> = vec![];
    for node in ne.nodes.iter() {
        if node.is_folded || node.category.as_deref() != Some(category) {
            continue;
        }
        let signature = ne.graph.connection_signature(&node.id);
        match group_index.get(&signature) {
            Some(&idx) => candidate_groups[idx].push(node),
            None => {
                group_index.insert(signature, candidate_groups.len());
                candidate_groups.push(vec![node]);
            }
        }
    }

    // Fold ids skip any number whose id is already taken by a node.
    let mut next_number = 1;
    let mut groups: Vec<FoldGroup> = vec![];
    for members in candidate_groups {
        if members.len() < threshold {
            continue;
        }
        let mut fold_id = format!("fold-{}-{}", category, next_number);
        while ne.node_lookup.contains_key(&fold_id) {
            debug!(%fold_id, "fold id already names a node");
            next_number += 1;
            fold_id = format!("fold-{}-{}", category, next_number);
        }
        next_number += 1;
        groups.push(FoldGroup {
            fold_id,
            members: members
                .into_iter()
                .map(|n| FoldedNodeRef {
                    id: n.id.clone(),
                    title: n.title.clone(),
                })
                .collect(),
        });
    }

    if groups.is_empty() {
        trace!("no fold groups reached the threshold");
        return;
    }

    // member id -> (group idx, is first member)
    let mut member_to_group: HashMap<String, (usize, bool)> = HashMap::new();
    for (group_idx, group) in groups.iter().enumerate() {
        trace!(
            fold_id = %group.fold_id,
            members = %group.members.iter().map(|m| m.id.as_str()).join(", "),
            "folding"
        );
        for (i, member) in group.members.iter().enumerate() {
            member_to_group.insert(member.id.clone(), (group_idx, i == 0));
        }
    }

    // The folded node takes the slot of its group's first member.
    let mut nodes = Vec::with_capacity(ne.nodes.len());
    for node in ne.nodes.drain(..) {
        match member_to_group.get(&node.id) {
            Some(&(group_idx, true)) => {
                let group = &groups[group_idx];
                nodes.push(Node {
                    id: group.fold_id.clone(),
                    title: None,
                    category: Some(category.to_string()),
                    depth: None,
                    row_data: None,
                    href: None,
                    symbol: icon.clone(),
                    is_folded: true,
                    folded_nodes: Some(group.members.clone()),
                });
            }
            Some(_) => {}
            None => nodes.push(node),
        }
    }
    ne.nodes = nodes;

    let resolve = |id: &String| {
        member_to_group
            .get(id)
            .map(|&(group_idx, _)| groups[group_idx].fold_id.as_str())
    };

    let mut edges: Vec<Edge> = Vec::with_capacity(ne.edges.len());
    let mut edge_positions: HashMap<String, usize> = HashMap::new();
    for edge in ne.edges.drain(..) {
        let new_from = resolve(&edge.from_id);
        let new_to = resolve(&edge.to_id);
        let edge = if new_from.is_none() && new_to.is_none() {
            edge
        } else {
            let from_id = new_from.unwrap_or(&edge.from_id).to_string();
            let to_id = new_to.unwrap_or(&edge.to_id).to_string();
            Edge {
                id: Edge::make_id(&from_id, &to_id),
                from_id,
                to_id,
                ..edge
            }
        };

        // Untouched edges can collide with rewritten ones too, since the
        // underscore join is ambiguous.
        match edge_positions.get(&edge.id) {
            Some(&pos) => {
                let merged = &mut edges[pos];
                merged.title = None;
                merged.category = None;
                merged.row_data = None;
                merged.is_folded = true;
            }
            None => {
                edge_positions.insert(edge.id.clone(), edges.len());
                edges.push(edge);
            }
        }
    }
    ne.edges = edges;

    for (member, &(group_idx, _)) in member_to_group.iter() {
        if ne.root_node_ids.remove(member) {
            ne.root_node_ids.insert(groups[group_idx].fold_id.clone());
        }
    }

    let category_ids: Vec<String> = ne
        .nodes
        .iter()
        .filter(|n| n.category.as_deref() == Some(category))
        .map(|n| n.id.clone())
        .collect();
    ne.node_category_map
        .insert(category.to_string(), category_ids);

    ne.rebuild_lookups();
    ne.rebuild_graph();
}
