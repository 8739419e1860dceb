//! JSON export of a [`CellTypeReport`].
//!
//! Tables are written in "split" layout, the shape pandas produces with
//! `to_json(orient="split")`, so existing notebook tooling can load them:
//!
//! ```text
//! table  → {"columns": [...], "index": [...], "data": [[...], ...]}
//! series → {"name": null, "index": [...], "data": [...]}
//! ```
//!
//! Matrix-level entries (`common-*`, `dist-matrix`, `average-distance`) are
//! omitted when fewer than two neurons were analyzed. An empty report
//! exports as `{}`.

use std::collections::BTreeMap;
use std::io::Write;

use ndarray::{Array1, Array2};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::analysis::{CellTypeReport, DirectionReport, NeuronMatches};
use crate::model::{BodyId, Direction};
use crate::Result;

const MATCH_COLUMNS: [&str; 4] = ["type", "neuron weight", "group weight", "good match"];
const MISSED_COLUMNS: [&str; 3] = ["type", "group weight", "neuron weight"];

/// A labelled two-dimensional table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitTable {
    pub columns: Vec<Value>,
    pub index: Vec<Value>,
    pub data: Vec<Vec<Value>>,
}

impl SplitTable {
    /// Table whose rows are numbered from zero.
    fn numbered(columns: &[&str], data: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| json!(c)).collect(),
            index: (0..data.len()).map(|i| json!(i)).collect(),
            data,
        }
    }

    fn from_matrix(columns: Vec<Value>, index: Vec<Value>, values: &Array2<f64>) -> Self {
        let data = values
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|v| json!(v)).collect())
            .collect();
        Self { columns, index, data }
    }
}

/// A labelled one-dimensional series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSeries {
    pub name: Option<String>,
    pub index: Vec<Value>,
    pub data: Vec<Value>,
}

impl SplitSeries {
    fn new(index: Vec<Value>, values: &Array1<f64>) -> Self {
        Self {
            name: None,
            index,
            data: values.iter().map(|v| json!(v)).collect(),
        }
    }
}

/// Suffix of the per-direction report keys, e.g. `neuron-inputs`.
fn key_suffix(dir: Direction) -> &'static str {
    match dir {
        Direction::Input => "inputs",
        Direction::Output => "outputs",
    }
}

fn ids(neurons: &[BodyId]) -> Vec<Value> {
    neurons.iter().map(|id| json!(id.0)).collect()
}

fn match_tables(matches: &BTreeMap<BodyId, NeuronMatches>) -> Map<String, Value> {
    matches
        .iter()
        .map(|(id, m)| {
            let rows = m
                .matches
                .iter()
                .map(|c| vec![json!(c.partner), json!(c.neuron_weight), json!(c.group_weight), json!(c.good_match)])
                .collect();
            (id.to_string(), json!(SplitTable::numbered(&MATCH_COLUMNS, rows)))
        })
        .collect()
}

fn missed_tables(matches: &BTreeMap<BodyId, NeuronMatches>) -> Map<String, Value> {
    matches
        .iter()
        .map(|(id, m)| {
            let rows = m
                .missed
                .iter()
                .map(|f| vec![json!(f.partner), json!(f.group_weight), json!(f.neuron_weight)])
                .collect();
            (id.to_string(), json!(SplitTable::numbered(&MISSED_COLUMNS, rows)))
        })
        .collect()
}

fn feature_table(report: &DirectionReport) -> SplitTable {
    let features = &report.features;
    let columns = features.column_names().into_iter().map(|c| json!(c)).collect();
    SplitTable::from_matrix(columns, ids(&features.neurons), &features.values)
}

fn median_series(report: &DirectionReport) -> SplitSeries {
    let index = report.features.column_names().into_iter().map(|c| json!(c)).collect();
    SplitSeries::new(index, &report.medians)
}

/// Render the report as a JSON object.
pub fn report_to_json(report: &CellTypeReport) -> Value {
    let mut out = Map::new();
    if report.is_empty() {
        return Value::Object(out);
    }

    let info: Map<String, Value> = report
        .neurons
        .iter()
        .map(|(id, info)| (id.to_string(), json!(info)))
        .collect();
    out.insert("neuroninfo".into(), Value::Object(info));
    out.insert("centroid-neuron".into(), json!(report.centroid.map(|id| id.0)));

    for dir in Direction::BOTH {
        let Some(section) = report.direction(dir) else { continue };
        let name = key_suffix(dir);
        out.insert(format!("neuron-{name}"), Value::Object(match_tables(&section.matches)));
        out.insert(format!("neuron-missed-{name}"), Value::Object(missed_tables(&section.matches)));
    }

    if report.neurons.len() >= 2 {
        for dir in Direction::BOTH {
            let Some(section) = report.direction(dir) else { continue };
            let name = key_suffix(dir);
            out.insert(format!("common-{name}"), json!(feature_table(section)));
            out.insert(format!("common-{name}-med"), json!(median_series(section)));
        }
        if let Some(dist) = &report.distances {
            let neurons: Vec<BodyId> = report.neurons.keys().copied().collect();
            let labels = ids(&neurons);
            out.insert("dist-matrix".into(), json!(SplitTable::from_matrix(labels.clone(), labels, dist)));
        }
        if let Some(avg) = report.average_distance {
            out.insert("average-distance".into(), json!(avg));
        }
    }

    Value::Object(out)
}

/// Write the report as pretty-printed JSON.
pub fn write_report(report: &CellTypeReport, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &report_to_json(report))?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_report_is_empty_object() {
        let json = report_to_json(&CellTypeReport::default());
        assert_eq!(json, json!({}));
    }

    #[test]
    fn test_direction_key_suffixes() {
        assert_eq!(format!("neuron-missed-{}", key_suffix(Direction::Input)), "neuron-missed-inputs");
        assert_eq!(format!("common-{}-med", key_suffix(Direction::Output)), "common-outputs-med");
    }

    #[test]
    fn test_numbered_table_layout() {
        let table = SplitTable::numbered(&MISSED_COLUMNS, vec![vec![json!("A"), json!(12.0), json!(0.0)]]);
        assert_eq!(
            json!(table),
            json!({
                "columns": ["type", "group weight", "neuron weight"],
                "index": [0],
                "data": [["A", 12.0, 0.0]],
            })
        );
    }

    #[test]
    fn test_matrix_table_layout() {
        let labels = vec![json!(1), json!(2)];
        let table = SplitTable::from_matrix(labels.clone(), labels, &array![[0.0, 0.5], [0.5, 0.0]]);
        assert_eq!(table.data, vec![vec![json!(0.0), json!(0.5)], vec![json!(0.5), json!(0.0)]]);
    }

    #[test]
    fn test_series_layout() {
        let series = SplitSeries::new(vec![json!("A")], &array![7.5]);
        assert_eq!(json!(series), json!({"name": null, "index": ["A"], "data": [7.5]}));
    }
}
