use clap::Args;

use super::interface::{unexpected_input, PipelineCommand, PipelineValues};
use crate::{
    errors::Result,
    file_format::{config::DashboardConfig, tabular::TabularResult},
};

/// Load a tabular query result from a JSON file.  This must be the first
/// command in a pipeline.
#[derive(Debug, Args)]
pub struct LoadData {
    /// Path to a `{ "columns": [...], "rows": [...] }` JSON file.
    #[clap(value_parser)]
    file: String,
}

#[derive(Debug)]
pub struct LoadDataCommand {
    pub args: LoadData,
}

impl PipelineCommand for LoadDataCommand {
    fn execute(&self, _config: &DashboardConfig, input: PipelineValues) -> Result<PipelineValues> {
        match input {
            PipelineValues::Void => {}
            other => return Err(unexpected_input("load-data", "nothing", &other)),
        }

        let data = TabularResult::load(&self.args.file)?;
        info!(
            file = %self.args.file,
            columns = data.columns.len(),
            rows = data.rows.len(),
            "loaded tabular data"
        );
        Ok(PipelineValues::TabularResult(data))
    }
}
