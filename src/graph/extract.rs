use regex::{Captures, Regex};
use serde_json::Value;

use super::types::{Category, Edge, Node, NodesAndEdges, RowError};
use crate::errors::{DashboardError, Result};
use crate::file_format::config::{CategoryConfigMap, ColorPalette};
use crate::file_format::tabular::{cell_to_i64, cell_to_string, ColumnIndex, Row, TabularResult};

lazy_static! {
    static ref HREF_PLACEHOLDER: Regex = Regex::new(r"\{\{\s*\.([A-Za-z0-9_]+)\s*\}\}").unwrap();
}

/// Build the node/edge model from a tabular result following the
/// `id`/`from_id`/`to_id`/`title`/`category`/`depth` column convention.
///
/// Each row is one of:
/// - A node row (`id` set), which creates or refines that node.  If it also
///   has `from_id` and/or `to_id`, an untitled edge into/out of the node is
///   recorded too.
/// - An edge row (`from_id` and `to_id` set, no `id`), which records an edge
///   carrying the row's title/category/row and creates placeholder nodes for
///   any endpoints we haven't seen yet.
///
/// Row order matters: later node rows overwrite the title/category/depth of
/// earlier ones, and nodes/edges are listed in discovery order.
///
/// An absent or empty result yields an empty model.  A result whose columns
/// include none of `id`/`from_id`/`to_id` is a `BadInput` error.  Rows that
/// can't be interpreted are skipped and reported in `row_errors`.
pub fn build_nodes_and_edges(
    raw_data: Option<&TabularResult>,
    categories: &CategoryConfigMap,
    palette: &ColorPalette,
) -> Result<NodesAndEdges> {
    let span = trace_span!("build_nodes_and_edges");
    let _span_guard = span.enter();

    let raw_data = match raw_data {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(NodesAndEdges::default()),
    };

    let columns = raw_data.column_index();
    if !(columns.has("id") || columns.has("from_id") || columns.has("to_id")) {
        return Err(DashboardError::bad_input(
            "no node or edge rows defined in the dataset",
        ));
    }

    let mut builder = NodesAndEdgesBuilder {
        columns,
        category_configs: categories,
        palette,
        result: NodesAndEdges::default(),
    };
    for (row_index, row) in raw_data.rows.iter().enumerate() {
        builder.process_row(row_index, row);
    }

    let mut result = builder.result;
    result.metadata.has_multiple_roots = result.root_node_ids.len() > 1;
    trace!(
        nodes = result.nodes.len(),
        edges = result.edges.len(),
        roots = result.root_node_ids.len(),
        skipped_rows = result.row_errors.len()
    );
    Ok(result)
}

struct NodesAndEdgesBuilder<'a> {
    columns: ColumnIndex,
    category_configs: &'a CategoryConfigMap,
    palette: &'a ColorPalette,
    result: NodesAndEdges,
}

/// The convention fields pulled out of a single row.
struct RowFields {
    node_id: Option<String>,
    from_id: Option<String>,
    to_id: Option<String>,
    title: Option<String>,
    category: Option<String>,
    depth: Option<i64>,
}

impl<'a> NodesAndEdgesBuilder<'a> {
    fn cell<'r>(&self, row: &'r Row, name: &str) -> Option<&'r Value> {
        if self.columns.has(name) {
            row.get(name)
        } else {
            None
        }
    }

    fn extract_fields(&self, row: &Row) -> RowFields {
        RowFields {
            node_id: cell_to_string(self.cell(row, "id")),
            from_id: cell_to_string(self.cell(row, "from_id")),
            to_id: cell_to_string(self.cell(row, "to_id")),
            title: cell_to_string(self.cell(row, "title")),
            category: cell_to_string(self.cell(row, "category")),
            depth: cell_to_i64(self.cell(row, "depth")),
        }
    }

    fn process_row(&mut self, row_index: usize, row: &Row) {
        let fields = self.extract_fields(row);

        match (fields.node_id, fields.from_id, fields.to_id) {
            (None, None, None) => {
                self.skip_row(row_index, "row does not define an id, from_id or to_id");
            }
            (Some(node_id), from_id, to_id) => {
                self.upsert_node(&node_id, fields.title, fields.category, fields.depth, row);
                // Title and category belong to the node, so the edges implied
                // by a node row are untitled.
                if let Some(from_id) = from_id {
                    self.ensure_node(&from_id, true);
                    self.result.root_node_ids.remove(&node_id);
                    self.record_edge(&from_id, &node_id, None, None, None);
                }
                if let Some(to_id) = to_id {
                    self.ensure_node(&to_id, false);
                    self.result.root_node_ids.remove(&to_id);
                    self.record_edge(&node_id, &to_id, None, None, None);
                }
            }
            (None, Some(from_id), Some(to_id)) => {
                self.ensure_node(&from_id, true);
                self.ensure_node(&to_id, false);
                self.result.root_node_ids.remove(&to_id);
                self.record_edge(
                    &from_id,
                    &to_id,
                    fields.title,
                    fields.category,
                    Some(row.clone()),
                );
            }
            (None, _, _) => {
                self.skip_row(row_index, "edge rows must define both from_id and to_id");
            }
        }
    }

    fn skip_row(&mut self, row_index: usize, message: &str) {
        warn!(row_index, "skipping row: {}", message);
        self.result.row_errors.push(RowError {
            row_index,
            message: message.to_string(),
        });
    }

    /// Create or refine a node from an explicit node row.  New nodes start out
    /// as root candidates.
    fn upsert_node(
        &mut self,
        node_id: &str,
        title: Option<String>,
        category: Option<String>,
        depth: Option<i64>,
        row: &Row,
    ) {
        let category_configs = self.category_configs;
        let category_config = category.as_ref().and_then(|c| category_configs.get(c));
        let symbol = category_config.and_then(|c| c.icon.clone());
        let href = category_config
            .and_then(|c| c.href.as_ref())
            .map(|template| render_href(template, row));

        if let Some(category) = &category {
            self.ensure_category(category);
        }

        if let Some(&idx) = self.result.node_lookup.get(node_id) {
            let node = &mut self.result.nodes[idx];
            let old_category = node.category.take();
            node.title = title;
            node.category = category.clone();
            node.depth = depth;
            node.row_data = Some(row.clone());
            node.href = href;
            node.symbol = symbol;
            trace!(node_id, "refined existing node");

            if old_category != category {
                if let Some(old) = old_category {
                    if let Some(ids) = self.result.node_category_map.get_mut(&old) {
                        ids.retain(|id| id != node_id);
                    }
                }
                if let Some(category) = category {
                    self.add_to_category_map(&category, node_id);
                }
            }
            return;
        }

        let node = Node {
            id: node_id.to_string(),
            title,
            category: category.clone(),
            depth,
            row_data: Some(row.clone()),
            href,
            symbol,
            is_folded: false,
            folded_nodes: None,
        };
        self.push_node(node, true);
        if let Some(category) = category {
            self.add_to_category_map(&category, node_id);
        }
    }

    /// Make sure a node referenced by an edge exists, creating an implicit
    /// placeholder if needed.  Only newly created placeholders can become
    /// roots.
    fn ensure_node(&mut self, node_id: &str, root_candidate: bool) {
        if self.result.node_lookup.contains_key(node_id) {
            return;
        }
        self.push_node(Node::implicit(node_id), root_candidate);
    }

    fn push_node(&mut self, node: Node, root_candidate: bool) {
        let id = node.id.clone();
        self.result.graph.add_node(&id);
        self.result
            .node_lookup
            .insert(id.clone(), self.result.nodes.len());
        self.result.nodes.push(node);
        if root_candidate {
            self.result.root_node_ids.insert(id);
        }
    }

    fn add_to_category_map(&mut self, category: &str, node_id: &str) {
        let ids = self
            .result
            .node_category_map
            .entry(category.to_string())
            .or_insert_with(Vec::new);
        if !ids.iter().any(|id| id == node_id) {
            ids.push(node_id.to_string());
        }
    }

    fn record_edge(
        &mut self,
        from_id: &str,
        to_id: &str,
        title: Option<String>,
        category: Option<String>,
        row_data: Option<Row>,
    ) {
        if let Some(category) = &category {
            self.ensure_category(category);
        }

        let id = Edge::make_id(from_id, to_id);
        let edge = Edge {
            id: id.clone(),
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            title,
            category,
            row_data,
            is_folded: false,
        };

        self.result.graph.add_edge(&id, from_id, to_id);
        match self.result.edge_lookup.get(&id) {
            Some(&idx) => {
                // Last write wins, but we remember that it happened.
                debug!(edge_id = %id, "duplicate edge");
                self.result.metadata.contains_duplicate_edges = true;
                self.result.edges[idx] = edge;
            }
            None => {
                self.result
                    .edge_lookup
                    .insert(id, self.result.edges.len());
                self.result.edges.push(edge);
            }
        }
    }

    /// Register a category the first time we see it, assigning its color from
    /// the config override or else the next palette entry.
    fn ensure_category(&mut self, name: &str) {
        if self.result.categories.contains_key(name) {
            return;
        }

        let category_configs = self.category_configs;
        let config = category_configs.get(name);
        let color = match config.and_then(|c| c.color.as_ref()) {
            Some(color) => Some(self.palette.theme.resolve_color_override(color)),
            None => self.next_palette_color(),
        };

        self.result.categories.insert(
            name.to_string(),
            Category {
                name: name.to_string(),
                color,
                fold: config.and_then(|c| c.fold.clone()),
                icon: config.and_then(|c| c.icon.clone()),
                href: config.and_then(|c| c.href.clone()),
            },
        );
    }

    /// Palette entries are handed out in order and wrap around once the
    /// palette is exhausted.
    fn next_palette_color(&mut self) -> Option<String> {
        let colors = &self.palette.colors;
        if colors.is_empty() {
            return None;
        }
        let color = colors[self.result.next_color_index % colors.len()].clone();
        self.result.next_color_index += 1;
        Some(color)
    }
}

/// Fill `{{.column}}` placeholders in an href template from the row.
fn render_href(template: &str, row: &Row) -> String {
    HREF_PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            cell_to_string(row.get(&caps[1])).unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorLayer;
    use crate::file_format::config::{CategoryConfig, FoldConfig};
    use serde_json::json;

    fn tabular(value: serde_json::Value) -> TabularResult {
        TabularResult::from_value(value).unwrap()
    }

    fn build(value: serde_json::Value) -> NodesAndEdges {
        build_with(value, &CategoryConfigMap::new())
    }

    fn build_with(value: serde_json::Value, categories: &CategoryConfigMap) -> NodesAndEdges {
        build_nodes_and_edges(Some(&tabular(value)), categories, &ColorPalette::default()).unwrap()
    }

    fn node_ids(ne: &NodesAndEdges) -> Vec<&str> {
        ne.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn edge_ids(ne: &NodesAndEdges) -> Vec<&str> {
        ne.edges.iter().map(|e| e.id.as_str()).collect()
    }

    fn roots(ne: &NodesAndEdges) -> Vec<&str> {
        ne.root_node_ids().collect()
    }

    #[test]
    fn test_absent_and_empty_data() {
        let palette = ColorPalette::default();
        let categories = CategoryConfigMap::new();

        let ne = build_nodes_and_edges(None, &categories, &palette).unwrap();
        assert_eq!(ne, NodesAndEdges::default());

        let ne = build_nodes_and_edges(Some(&TabularResult::default()), &categories, &palette)
            .unwrap();
        assert!(ne.nodes.is_empty());
        assert!(ne.edges.is_empty());
        assert_eq!(ne.next_color_index, 0);
    }

    #[test]
    fn test_missing_columns_or_rows_is_empty() {
        let palette = ColorPalette::default();
        let categories = CategoryConfigMap::new();

        let rows_only = tabular(json!({ "rows": [{ "id": "a" }] }));
        let ne = build_nodes_and_edges(Some(&rows_only), &categories, &palette).unwrap();
        assert_eq!(ne, NodesAndEdges::default());

        let columns_only = tabular(json!({ "columns": [{ "name": "title", "data_type": "text" }] }));
        let ne = build_nodes_and_edges(Some(&columns_only), &categories, &palette).unwrap();
        assert_eq!(ne, NodesAndEdges::default());
    }

    #[test]
    fn test_no_id_columns_is_bad_input() {
        let raw = tabular(json!({
            "columns": [{ "name": "title", "data_type": "text" }],
            "rows": [{ "title": "orphan" }],
        }));
        let err = build_nodes_and_edges(Some(&raw), &CategoryConfigMap::new(), &ColorPalette::default())
            .unwrap_err();
        assert_eq!(err.layer, ErrorLayer::BadInput);
        assert_eq!(err.message, "no node or edge rows defined in the dataset");
    }

    #[test]
    fn test_single_node() {
        let ne = build(json!({
            "columns": [{ "name": "id", "data_type": "text" }],
            "rows": [{ "id": "node" }],
        }));

        assert_eq!(
            serde_json::to_value(&ne.nodes).unwrap(),
            json!([{
                "id": "node",
                "title": null,
                "category": null,
                "depth": null,
                "row_data": { "id": "node" },
                "href": null,
                "symbol": null,
                "isFolded": false,
            }])
        );
        assert_eq!(roots(&ne), vec!["node"]);
        assert!(ne.edges.is_empty());
        assert!(!ne.metadata.has_multiple_roots);
        assert!(!ne.metadata.contains_duplicate_edges);
    }

    #[test]
    fn test_nodes_then_edge_row() {
        let ne = build(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
            ],
            "rows": [
                { "id": "from_node", "from_id": null, "to_id": null },
                { "id": "to_node", "from_id": null, "to_id": null },
                { "id": null, "from_id": "from_node", "to_id": "to_node" },
            ],
        }));

        assert_eq!(node_ids(&ne), vec!["from_node", "to_node"]);
        assert_eq!(edge_ids(&ne), vec!["from_node_to_node"]);
        assert_eq!(roots(&ne), vec!["from_node"]);
        let edge = ne.edge("from_node_to_node").unwrap();
        assert_eq!(edge.from_id, "from_node");
        assert_eq!(edge.to_id, "to_node");
        assert!(edge.row_data.is_some());
    }

    #[test]
    fn test_edge_row_creates_implicit_nodes() {
        let ne = build(json!({
            "columns": [
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
                { "name": "title", "data_type": "text" },
                { "name": "category", "data_type": "text" },
            ],
            "rows": [
                { "from_id": "a", "to_id": "b", "title": "uses", "category": "dependency" },
            ],
        }));

        assert_eq!(node_ids(&ne), vec!["a", "b"]);
        assert_eq!(ne.node("a"), Some(&Node::implicit("a")));
        assert_eq!(ne.node("b"), Some(&Node::implicit("b")));
        assert_eq!(roots(&ne), vec!["a"]);

        let edge = ne.edge("a_b").unwrap();
        assert_eq!(edge.title.as_deref(), Some("uses"));
        assert_eq!(edge.category.as_deref(), Some("dependency"));
        // Edge categories get colors but aren't node categories.
        assert!(ne.categories.contains_key("dependency"));
        assert!(ne.category_nodes("dependency").is_empty());
    }

    #[test]
    fn test_implicit_node_completed_by_later_row() {
        let ne = build(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
                { "name": "title", "data_type": "text" },
                { "name": "category", "data_type": "text" },
                { "name": "depth", "data_type": "int4" },
            ],
            "rows": [
                { "from_id": "a", "to_id": "b" },
                { "id": "b", "title": "Bee", "category": "insect", "depth": 2 },
            ],
        }));

        assert_eq!(node_ids(&ne), vec!["a", "b"]);
        let b = ne.node("b").unwrap();
        assert_eq!(b.title.as_deref(), Some("Bee"));
        assert_eq!(b.category.as_deref(), Some("insect"));
        assert_eq!(b.depth, Some(2));
        assert!(b.row_data.is_some());
        // Completing a target node doesn't make it a root again.
        assert_eq!(roots(&ne), vec!["a"]);
        assert_eq!(ne.category_node_ids("insect"), &["b".to_string()]);
    }

    #[test]
    fn test_later_rows_overwrite_node_fields() {
        let ne = build(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "title", "data_type": "text" },
                { "name": "category", "data_type": "text" },
            ],
            "rows": [
                { "id": "n", "title": "first", "category": "one" },
                { "id": "n", "title": "second", "category": "two" },
            ],
        }));

        assert_eq!(ne.nodes.len(), 1);
        let n = ne.node("n").unwrap();
        assert_eq!(n.title.as_deref(), Some("second"));
        assert_eq!(n.category.as_deref(), Some("two"));
        assert!(ne.category_node_ids("one").is_empty());
        assert_eq!(ne.category_node_ids("two"), &["n".to_string()]);
    }

    #[test]
    fn test_node_row_with_from_id() {
        let ne = build(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "from_id", "data_type": "text" },
                { "name": "title", "data_type": "text" },
            ],
            "rows": [
                { "id": "parent", "title": "Parent" },
                { "id": "child", "from_id": "parent", "title": "Child" },
                { "id": "orphan", "from_id": "ghost", "title": "Orphan" },
            ],
        }));

        assert_eq!(node_ids(&ne), vec!["parent", "child", "orphan", "ghost"]);
        assert_eq!(edge_ids(&ne), vec!["parent_child", "ghost_orphan"]);
        let edge = ne.edge("parent_child").unwrap();
        assert_eq!(edge.title, None);
        assert_eq!(edge.category, None);
        assert_eq!(edge.row_data, None);
        assert_eq!(roots(&ne), vec!["ghost", "parent"]);
        assert!(ne.metadata.has_multiple_roots);
    }

    #[test]
    fn test_node_row_with_to_id() {
        let ne = build(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
            ],
            "rows": [
                { "id": "a", "to_id": "b" },
                { "id": "b", "to_id": null },
            ],
        }));

        assert_eq!(edge_ids(&ne), vec!["a_b"]);
        assert_eq!(roots(&ne), vec!["a"]);
    }

    #[test]
    fn test_edge_id_independent_of_row_order() {
        let rows_forward = json!([
            { "id": "x" },
            { "id": "y" },
            { "from_id": "x", "to_id": "y" },
        ]);
        let rows_backward = json!([
            { "from_id": "x", "to_id": "y" },
            { "id": "y" },
            { "id": "x" },
        ]);
        let columns = json!([
            { "name": "id", "data_type": "text" },
            { "name": "from_id", "data_type": "text" },
            { "name": "to_id", "data_type": "text" },
        ]);

        for rows in [rows_forward, rows_backward].iter() {
            let ne = build(json!({ "columns": columns, "rows": rows }));
            assert_eq!(edge_ids(&ne), vec!["x_y"]);
            assert_eq!(roots(&ne), vec!["x"]);
        }
    }

    #[test]
    fn test_duplicate_edges_detected_last_write_wins() {
        let ne = build(json!({
            "columns": [
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
                { "name": "title", "data_type": "text" },
            ],
            "rows": [
                { "from_id": "a", "to_id": "b", "title": "first" },
                { "from_id": "a", "to_id": "c", "title": "other" },
                { "from_id": "a", "to_id": "b", "title": "second" },
            ],
        }));

        assert!(ne.metadata.contains_duplicate_edges);
        assert_eq!(edge_ids(&ne), vec!["a_b", "a_c"]);
        assert_eq!(ne.edge("a_b").unwrap().title.as_deref(), Some("second"));
        assert_eq!(ne.graph.edge_count(), 2);
    }

    #[test]
    fn test_distinct_edges_are_not_duplicates() {
        let ne = build(json!({
            "columns": [
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
            ],
            "rows": [
                { "from_id": "a", "to_id": "b" },
                { "from_id": "b", "to_id": "a" },
                { "from_id": "a", "to_id": "c" },
            ],
        }));

        assert!(!ne.metadata.contains_duplicate_edges);
        assert_eq!(edge_ids(&ne), vec!["a_b", "b_a", "a_c"]);
        // Everything is the target of something.
        assert!(roots(&ne).is_empty());
    }

    #[test]
    fn test_self_loop_is_never_a_root() {
        let ne = build(json!({
            "columns": [
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
            ],
            "rows": [{ "from_id": "loop", "to_id": "loop" }],
        }));
        assert_eq!(edge_ids(&ne), vec!["loop_loop"]);
        assert!(roots(&ne).is_empty());
    }

    #[test]
    fn test_root_invariant() {
        let ne = build(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
            ],
            "rows": [
                { "id": "r1" },
                { "id": "c1", "from_id": "r1" },
                { "from_id": "c1", "to_id": "c2" },
                { "from_id": "r2", "to_id": "c2" },
                { "id": "c2" },
                { "id": "lonely" },
            ],
        }));

        let targets: Vec<&str> = ne.edges.iter().map(|e| e.to_id.as_str()).collect();
        for node in ne.nodes.iter() {
            assert_eq!(
                ne.is_root(&node.id),
                !targets.contains(&node.id.as_str()),
                "root status of {}",
                node.id
            );
        }
        assert_eq!(roots(&ne), vec!["lonely", "r1", "r2"]);
        assert!(ne.metadata.has_multiple_roots);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let ne = build(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
            ],
            "rows": [
                { "id": null, "from_id": null, "to_id": null },
                { "id": "ok" },
                { "from_id": "dangling" },
            ],
        }));

        assert_eq!(node_ids(&ne), vec!["ok"]);
        assert_eq!(ne.row_errors.len(), 2);
        assert_eq!(ne.row_errors[0].row_index, 0);
        assert_eq!(ne.row_errors[1].row_index, 2);
    }

    #[test]
    fn test_numeric_ids_are_stringified() {
        let ne = build(json!({
            "columns": [
                { "name": "from_id", "data_type": "int8" },
                { "name": "to_id", "data_type": "int8" },
            ],
            "rows": [{ "from_id": 1, "to_id": 2 }],
        }));
        assert_eq!(edge_ids(&ne), vec!["1_2"]);
    }

    #[test]
    fn test_columns_not_declared_are_ignored() {
        // The row carries a `from_id` key but the dataset doesn't declare it.
        let ne = build(json!({
            "columns": [{ "name": "id", "data_type": "text" }],
            "rows": [{ "id": "a", "from_id": "b" }],
        }));
        assert_eq!(node_ids(&ne), vec!["a"]);
        assert!(ne.edges.is_empty());
    }

    #[test]
    fn test_category_colors() {
        let mut categories = CategoryConfigMap::new();
        categories.insert(
            "broken".to_string(),
            CategoryConfig {
                color: Some("alert".to_string()),
                ..CategoryConfig::default()
            },
        );
        categories.insert(
            "custom".to_string(),
            CategoryConfig {
                color: Some("#123456".to_string()),
                ..CategoryConfig::default()
            },
        );

        let raw = tabular(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "category", "data_type": "text" },
            ],
            "rows": [
                { "id": "a", "category": "plain" },
                { "id": "b", "category": "broken" },
                { "id": "c", "category": "custom" },
                { "id": "d", "category": "other" },
                { "id": "e", "category": "plain" },
                { "id": "f", "category": "third" },
            ],
        }));
        let palette = ColorPalette {
            colors: vec!["red".to_string(), "green".to_string()],
            ..ColorPalette::default()
        };
        let ne = build_nodes_and_edges(Some(&raw), &categories, &palette).unwrap();

        let color = |name: &str| ne.categories[name].color.clone();
        assert_eq!(color("plain"), Some("red".to_string()));
        assert_eq!(color("broken"), Some(palette.theme.alert.clone()));
        assert_eq!(color("custom"), Some("#123456".to_string()));
        assert_eq!(color("other"), Some("green".to_string()));
        // The palette wraps once exhausted.
        assert_eq!(color("third"), Some("red".to_string()));
        assert_eq!(ne.next_color_index, 3);
        assert_eq!(
            ne.category_node_ids("plain"),
            &["a".to_string(), "e".to_string()]
        );
    }

    #[test]
    fn test_empty_palette_leaves_colors_unset() {
        let raw = tabular(json!({
            "columns": [
                { "name": "id", "data_type": "text" },
                { "name": "category", "data_type": "text" },
            ],
            "rows": [{ "id": "a", "category": "plain" }],
        }));
        let palette = ColorPalette {
            colors: vec![],
            ..ColorPalette::default()
        };
        let ne = build_nodes_and_edges(Some(&raw), &CategoryConfigMap::new(), &palette).unwrap();
        assert_eq!(ne.categories["plain"].color, None);
        assert_eq!(ne.next_color_index, 0);
    }

    #[test]
    fn test_category_icon_href_and_fold_carried() {
        let mut categories = CategoryConfigMap::new();
        categories.insert(
            "user".to_string(),
            CategoryConfig {
                icon: Some("person".to_string()),
                href: Some("/users/{{.id}}?name={{ .title }}&x={{.missing}}".to_string()),
                fold: Some(FoldConfig {
                    threshold: Some(3),
                    icon: Some("people".to_string()),
                }),
                ..CategoryConfig::default()
            },
        );

        let ne = build_with(
            json!({
                "columns": [
                    { "name": "id", "data_type": "text" },
                    { "name": "from_id", "data_type": "text" },
                    { "name": "title", "data_type": "text" },
                    { "name": "category", "data_type": "text" },
                ],
                "rows": [
                    { "id": "u1", "title": "ann", "category": "user", "from_id": "org" },
                ],
            }),
            &categories,
        );

        let u1 = ne.node("u1").unwrap();
        assert_eq!(u1.symbol.as_deref(), Some("person"));
        assert_eq!(u1.href.as_deref(), Some("/users/u1?name=ann&x="));
        // The implicit node stays bare.
        let org = ne.node("org").unwrap();
        assert_eq!(org.symbol, None);
        assert_eq!(org.href, None);

        let user = &ne.categories["user"];
        assert_eq!(user.fold.as_ref().and_then(|f| f.effective_threshold()), Some(3));
        assert_eq!(user.icon.as_deref(), Some("person"));
    }

    #[test]
    fn test_graph_handle_mirrors_edges() {
        let ne = build(json!({
            "columns": [
                { "name": "from_id", "data_type": "text" },
                { "name": "to_id", "data_type": "text" },
            ],
            "rows": [
                { "from_id": "a", "to_id": "b" },
                { "from_id": "a", "to_id": "c" },
            ],
        }));
        assert_eq!(ne.graph.node_count(), 3);
        assert_eq!(ne.graph.successors("a"), vec!["b", "c"]);
        assert!(ne.graph.is_acyclic());
    }
}
