use std::fmt::Debug;

use serde::Serialize;
use serde_json::{to_value, Value};

pub use crate::errors::Result;
use crate::{
    chart::ChartDataset,
    errors::DashboardError,
    file_format::{config::DashboardConfig, tabular::TabularResult},
    graph::{NodesAndEdges, TreeNode},
};

/// A list of hierarchy trees, one per root node.
#[derive(Debug, Serialize)]
pub struct TreeList {
    pub trees: Vec<TreeNode>,
}

/// The input and output of each pipeline segment
#[derive(Debug, Serialize)]
pub enum PipelineValues {
    TabularResult(TabularResult),
    NodesAndEdges(NodesAndEdges),
    TreeList(TreeList),
    ChartDataset(ChartDataset),
    Void,
}

impl PipelineValues {
    /// Human readable name of the variant for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineValues::TabularResult(_) => "tabular result",
            PipelineValues::NodesAndEdges(_) => "nodes and edges",
            PipelineValues::TreeList(_) => "tree list",
            PipelineValues::ChartDataset(_) => "chart dataset",
            PipelineValues::Void => "nothing",
        }
    }

    /// The JSON rep of the payload without the variant wrapper, which is what
    /// consumers of the tool want to see.
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            PipelineValues::TabularResult(tr) => to_value(tr)?,
            PipelineValues::NodesAndEdges(ne) => to_value(ne)?,
            PipelineValues::TreeList(tl) => to_value(tl)?,
            PipelineValues::ChartDataset(cd) => to_value(cd)?,
            PipelineValues::Void => Value::Null,
        })
    }
}

/// Error for a command that was handed something it can't consume, which
/// means the pipeline itself is nonsensical.
pub fn unexpected_input(command: &str, wanted: &str, got: &PipelineValues) -> DashboardError {
    DashboardError::bad_input(format!(
        "{} expects {} as input but got {}",
        command,
        wanted,
        got.kind()
    ))
}

/// A pipeline segment.  Commands are pure functions of the config, their
/// arguments and the previous segment's output.
pub trait PipelineCommand: Debug {
    fn execute(&self, config: &DashboardConfig, input: PipelineValues) -> Result<PipelineValues>;
}

/// A linear sequence of commands sharing one config.
#[derive(Debug)]
pub struct Pipeline {
    pub config: DashboardConfig,
    pub commands: Vec<Box<dyn PipelineCommand + Send + Sync>>,
}

impl Pipeline {
    pub fn run(&self) -> Result<PipelineValues> {
        let mut cur_values = PipelineValues::Void;

        for cmd in &self.commands {
            let span = trace_span!("run_pipeline_step", cmd = ?cmd);
            let _span_guard = span.enter();

            match cmd.execute(&self.config, cur_values) {
                Ok(next_values) => {
                    trace!(output = next_values.kind());
                    cur_values = next_values;
                }
                Err(err) => {
                    trace!(err = ?err);
                    return Err(err);
                }
            }
        }

        Ok(cur_values)
    }
}
