use clap::{Parser, Subcommand, ValueEnum};

use super::cmd_build_graph::BuildGraph;
use super::cmd_build_tree::BuildTree;
use super::cmd_chart_dataset::ChartDataset;
use super::cmd_fold_graph::FoldGraph;
use super::cmd_load_data::LoadData;

#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Pretty,
    /// Un-pretty-printed JSON.
    Concise,
}

#[derive(Debug, Parser)]
pub struct ToolOpts {
    /// Path to the dashboard config file providing the palette, theme colors,
    /// category and chart properties.  Files ending in `.toml` are read as
    /// TOML, anything else as JSON.  Defaults are used if omitted.
    #[arg(long, env = "DASHBOARD_CONFIG")]
    pub config: Option<String>,

    #[arg(long, short, value_enum, ignore_case = true, default_value = "concise")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    BuildGraph(BuildGraph),
    BuildTree(BuildTree),
    ChartDataset(ChartDataset),
    FoldGraph(FoldGraph),
    LoadData(LoadData),
}
