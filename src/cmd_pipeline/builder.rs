use clap::Parser;

use super::cmd_build_graph::BuildGraphCommand;
use super::cmd_build_tree::BuildTreeCommand;
use super::cmd_chart_dataset::ChartDatasetCommand;
use super::cmd_fold_graph::FoldGraphCommand;
use super::cmd_load_data::LoadDataCommand;
use super::interface::{Pipeline, PipelineCommand};
use super::parser::{Command, OutputFormat, ToolOpts};
use crate::errors::{DashboardError, Result};
use crate::file_format::config::{self, DashboardConfig};

pub fn fab_command_from_opts(opts: ToolOpts) -> Box<dyn PipelineCommand + Send + Sync> {
    match opts.cmd {
        Command::BuildGraph(bg) => Box::new(BuildGraphCommand { args: bg }),

        Command::BuildTree(bt) => Box::new(BuildTreeCommand { args: bt }),

        Command::ChartDataset(cd) => Box::new(ChartDatasetCommand { args: cd }),

        Command::FoldGraph(fg) => Box::new(FoldGraphCommand { args: fg }),

        Command::LoadData(ld) => Box::new(LoadDataCommand { args: ld }),
    }
}

/// Build a command pipeline from a shell-y string where we use pipe boundaries
/// to delineate the separate pipeline steps.
///
/// The shell-words module is used to parse `arg_str` into shell words, which we
/// then break into separate sub-commands whenever we see a `|`.  We then pass
/// these sub-commands to clap's `try_parse_from`, taking care to stuff our
/// binary name into the first arg.  Global options like `--config` are only
/// honored on the first segment.
pub fn build_pipeline(bin_name: &str, arg_str: &str) -> Result<(Pipeline, OutputFormat)> {
    let span = trace_span!("build_pipeline", arg_str);
    let _span_guard = span.enter();

    let all_args =
        shell_words::split(arg_str).map_err(|err| DashboardError::bad_input(err.to_string()))?;

    let mut pipeline_config = None;
    let mut output_format = None;
    let mut commands: Vec<Box<dyn PipelineCommand + Send + Sync>> = vec![];

    for arg_slices in all_args.split(|v| v == "|") {
        let mut fake_args = vec![bin_name.to_string()];
        fake_args.extend(arg_slices.iter().cloned());

        let opts = ToolOpts::try_parse_from(fake_args)
            .map_err(|err| DashboardError::bad_input(err.to_string()))?;

        if pipeline_config.is_none() {
            pipeline_config = Some(match &opts.config {
                Some(path) => config::load(path)?,
                None => DashboardConfig::default(),
            });
            output_format = Some(opts.output_format.clone());
        }

        trace!(cmd = ?opts.cmd);
        commands.push(fab_command_from_opts(opts));
    }

    match (pipeline_config, output_format) {
        (Some(config), Some(output_format)) => Ok((Pipeline { config, commands }, output_format)),
        _ => Err(DashboardError::bad_input("empty pipeline")),
    }
}
