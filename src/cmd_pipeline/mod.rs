pub mod builder;
pub mod interface;
pub mod parser;

mod cmd_build_graph;
mod cmd_build_tree;
mod cmd_chart_dataset;
mod cmd_fold_graph;
mod cmd_load_data;

pub use builder::build_pipeline;
pub use interface::{Pipeline, PipelineCommand, PipelineValues};
