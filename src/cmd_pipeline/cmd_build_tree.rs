use clap::Args;

use super::interface::{unexpected_input, PipelineCommand, PipelineValues, TreeList};
use crate::{errors::Result, file_format::config::DashboardConfig, graph::build_tree};

/// Expand a graph into nested trees starting from its root nodes.  Fails if
/// the graph has a cycle.
#[derive(Debug, Args)]
pub struct BuildTree {}

#[derive(Debug)]
pub struct BuildTreeCommand {
    pub args: BuildTree,
}

impl PipelineCommand for BuildTreeCommand {
    fn execute(&self, _config: &DashboardConfig, input: PipelineValues) -> Result<PipelineValues> {
        let ne = match input {
            PipelineValues::NodesAndEdges(ne) => ne,
            other => return Err(unexpected_input("build-tree", "nodes and edges", &other)),
        };

        Ok(PipelineValues::TreeList(TreeList {
            trees: build_tree(&ne)?,
        }))
    }
}
