use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::file_format::config::{ChartProperties, DataTransform};
use crate::file_format::tabular::{cell_to_string, Column, TabularResult};

/// The transform that was actually applied to produce a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedTransform {
    None,
    Crosstab,
}

/// Row-major chart input: the first row is the header, the first column is
/// the category axis, and every other column is a series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartDataset {
    pub dataset: Vec<Vec<Value>>,
    #[serde(rename = "rowSeriesLabels")]
    pub row_series_labels: Vec<String>,
    pub transform: AppliedTransform,
}

/// Whether data looks like (category, series, value) triples: exactly three
/// columns where only the last is numeric.
pub fn is_crosstab_shaped(columns: &[Column]) -> bool {
    columns.len() == 3
        && !columns[0].is_numeric()
        && !columns[1].is_numeric()
        && columns[2].is_numeric()
}

/// Convert a tabular result into a chart dataset, pivoting it into an
/// axis-by-series matrix when asked to (or, for "auto", when it has the
/// crosstab shape).
pub fn build_chart_dataset(data: &TabularResult, properties: &ChartProperties) -> ChartDataset {
    let span = trace_span!("build_chart_dataset");
    let _span_guard = span.enter();

    let requested = properties.transform.unwrap_or_default();
    let use_crosstab = match requested {
        DataTransform::None => false,
        DataTransform::Auto => is_crosstab_shaped(&data.columns),
        DataTransform::Crosstab => {
            if data.columns.len() < 3 {
                warn!(
                    columns = data.columns.len(),
                    "crosstab needs three columns; passing data through"
                );
                false
            } else {
                true
            }
        }
    };
    trace!(?requested, use_crosstab);

    if use_crosstab {
        crosstab(data)
    } else {
        passthrough(data)
    }
}

fn passthrough(data: &TabularResult) -> ChartDataset {
    if data.columns.is_empty() {
        return ChartDataset {
            dataset: vec![],
            row_series_labels: vec![],
            transform: AppliedTransform::None,
        };
    }

    let mut dataset = Vec::with_capacity(data.rows.len() + 1);
    dataset.push(
        data.columns
            .iter()
            .map(|c| Value::String(c.name.clone()))
            .collect(),
    );
    for row in data.rows.iter() {
        dataset.push(data.positional_cells(row));
    }

    ChartDataset {
        dataset,
        row_series_labels: data.columns.iter().skip(1).map(|c| c.name.clone()).collect(),
        transform: AppliedTransform::None,
    }
}

/// Running total for one crosstab cell.  Stays integral until a fractional
/// value shows up so that integer data renders as integers.
#[derive(Clone, Copy, Debug)]
enum CellSum {
    Int(i64),
    Float(f64),
}

impl CellSum {
    fn from_value(value: &Value) -> Option<CellSum> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(CellSum::Int(i)),
                None => n.as_f64().map(CellSum::Float),
            },
            Value::String(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(i) => Some(CellSum::Int(i)),
                    Err(_) => s.parse::<f64>().ok().filter(|f| f.is_finite()).map(CellSum::Float),
                }
            }
            _ => None,
        }
    }

    fn add(self, other: CellSum) -> CellSum {
        match (self, other) {
            (CellSum::Int(a), CellSum::Int(b)) => match a.checked_add(b) {
                Some(sum) => CellSum::Int(sum),
                None => CellSum::Float(a as f64 + b as f64),
            },
            (a, b) => CellSum::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            CellSum::Int(i) => i as f64,
            CellSum::Float(f) => f,
        }
    }

    fn into_value(self) -> Value {
        match self {
            CellSum::Int(i) => Value::Number(i.into()),
            CellSum::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}

/// Pivot column 0 (axis) x column 1 (series) summing column 2.  Axis values and
/// series names keep first-seen order; combinations that never occur are null.
fn crosstab(data: &TabularResult) -> ChartDataset {
    let axis_column = &data.columns[0].name;
    let series_column = &data.columns[1].name;
    let value_column = &data.columns[2].name;

    let mut axis_values: Vec<Value> = vec![];
    let mut axis_positions: HashMap<String, usize> = HashMap::new();
    let mut series_names: Vec<String> = vec![];
    let mut series_positions: HashMap<String, usize> = HashMap::new();
    let mut cells: HashMap<(usize, usize), CellSum> = HashMap::new();

    for row in data.rows.iter() {
        let axis_value = row.get(axis_column).cloned().unwrap_or(Value::Null);
        // Key on the JSON text so that distinct value types don't collide.
        let axis_key = axis_value.to_string();
        let axis_pos = match axis_positions.get(&axis_key) {
            Some(&pos) => pos,
            None => {
                axis_positions.insert(axis_key, axis_values.len());
                axis_values.push(axis_value);
                axis_values.len() - 1
            }
        };

        let series_name =
            cell_to_string(row.get(series_column)).unwrap_or_else(|| "null".to_string());
        let series_pos = match series_positions.get(&series_name) {
            Some(&pos) => pos,
            None => {
                series_positions.insert(series_name.clone(), series_names.len());
                series_names.push(series_name);
                series_names.len() - 1
            }
        };

        match row.get(value_column).and_then(CellSum::from_value) {
            Some(value) => {
                let sum = match cells.get(&(axis_pos, series_pos)) {
                    Some(existing) => existing.add(value),
                    None => value,
                };
                cells.insert((axis_pos, series_pos), sum);
            }
            None => {
                trace!(axis_pos, series_pos, "non-numeric crosstab value ignored");
            }
        }
    }

    let mut dataset = Vec::with_capacity(axis_values.len() + 1);
    let mut header = vec![Value::String(axis_column.clone())];
    header.extend(series_names.iter().cloned().map(Value::String));
    dataset.push(header);

    for (axis_pos, axis_value) in axis_values.into_iter().enumerate() {
        let mut out_row = Vec::with_capacity(series_names.len() + 1);
        out_row.push(axis_value);
        for series_pos in 0..series_names.len() {
            out_row.push(
                cells
                    .get(&(axis_pos, series_pos))
                    .map_or(Value::Null, |sum| sum.into_value()),
            );
        }
        dataset.push(out_row);
    }

    ChartDataset {
        dataset,
        row_series_labels: series_names,
        transform: AppliedTransform::Crosstab,
    }
}
