use clap::Args;

use super::interface::{unexpected_input, PipelineCommand, PipelineValues};
use crate::{
    errors::Result,
    file_format::config::DashboardConfig,
    graph::build_nodes_and_edges,
};

/// Extract nodes and edges from tabular data using the configured categories
/// and palette.
#[derive(Debug, Args)]
pub struct BuildGraph {}

#[derive(Debug)]
pub struct BuildGraphCommand {
    pub args: BuildGraph,
}

impl PipelineCommand for BuildGraphCommand {
    fn execute(&self, config: &DashboardConfig, input: PipelineValues) -> Result<PipelineValues> {
        let data = match input {
            PipelineValues::TabularResult(tr) => tr,
            other => return Err(unexpected_input("build-graph", "tabular data", &other)),
        };

        let ne = build_nodes_and_edges(Some(&data), &config.categories, &config.color_palette())?;
        if !ne.row_errors.is_empty() {
            warn!(count = ne.row_errors.len(), "some rows were skipped");
        }
        Ok(PipelineValues::NodesAndEdges(ne))
    }
}
