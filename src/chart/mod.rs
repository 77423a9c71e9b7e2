pub mod dataset;

pub use dataset::{build_chart_dataset, is_crosstab_shaped, AppliedTransform, ChartDataset};
