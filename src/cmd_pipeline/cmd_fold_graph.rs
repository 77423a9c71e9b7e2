use clap::Args;

use super::interface::{unexpected_input, PipelineCommand, PipelineValues};
use crate::{errors::Result, file_format::config::DashboardConfig, graph::fold_nodes_and_edges};

/// Collapse structurally equivalent nodes of categories that have a fold
/// threshold configured.
#[derive(Debug, Args)]
pub struct FoldGraph {}

#[derive(Debug)]
pub struct FoldGraphCommand {
    pub args: FoldGraph,
}

impl PipelineCommand for FoldGraphCommand {
    fn execute(&self, _config: &DashboardConfig, input: PipelineValues) -> Result<PipelineValues> {
        match input {
            PipelineValues::NodesAndEdges(ne) => {
                Ok(PipelineValues::NodesAndEdges(fold_nodes_and_edges(&ne)))
            }
            other => Err(unexpected_input("fold-graph", "nodes and edges", &other)),
        }
    }
}
