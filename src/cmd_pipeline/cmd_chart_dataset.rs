use clap::Args;

use super::interface::{unexpected_input, PipelineCommand, PipelineValues};
use crate::{
    chart::build_chart_dataset,
    errors::Result,
    file_format::config::{ChartProperties, DashboardConfig, DataTransform},
};

/// Turn tabular data into a chart dataset, pivoting (category, series, value)
/// triples into a matrix when appropriate.
#[derive(Debug, Args)]
pub struct ChartDataset {
    /// Overrides the `chart.transform` property of the config.
    #[clap(long, value_parser, value_enum)]
    transform: Option<DataTransform>,
}

#[derive(Debug)]
pub struct ChartDatasetCommand {
    pub args: ChartDataset,
}

impl PipelineCommand for ChartDatasetCommand {
    fn execute(&self, config: &DashboardConfig, input: PipelineValues) -> Result<PipelineValues> {
        let data = match input {
            PipelineValues::TabularResult(tr) => tr,
            other => return Err(unexpected_input("chart-dataset", "tabular data", &other)),
        };

        let properties = ChartProperties {
            transform: self.args.transform.or(config.chart.transform),
        };
        Ok(PipelineValues::ChartDataset(build_chart_dataset(
            &data,
            &properties,
        )))
    }
}
