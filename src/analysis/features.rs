//! Partner-type ranking and feature tables.
//!
//! The reference set's important connections are merged into one ranked
//! list of partner-type columns; every neuron is then projected onto those
//! columns to give a dense neuron × partner-type weight matrix.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hashbrown::HashMap;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

use crate::model::BodyId;

use super::importance::{list_for, RankedLists};

/// One feature column: a partner type and the weight that ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPartner {
    pub partner: String,
    pub weight: u64,
    pub has_type: bool,
}

/// Dense feature matrix for one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    /// Row labels, ascending body id.
    pub neurons: Vec<BodyId>,
    /// Column labels in rank order.
    pub columns: Vec<RankedPartner>,
    /// `values[[row, col]]` is the neuron's weight to that column's partner.
    pub values: Array2<f64>,
}

impl FeatureTable {
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.partner.as_str()).collect()
    }

    pub fn row_index(&self, id: BodyId) -> Option<usize> {
        self.neurons.binary_search(&id).ok()
    }

    pub fn row(&self, id: BodyId) -> Option<ArrayView1<'_, f64>> {
        self.row_index(id).map(|r| self.values.row(r))
    }

    /// Rows for `ids`, in ascending id order. Unknown ids are skipped.
    pub fn select_rows(&self, ids: &BTreeSet<BodyId>) -> Array2<f64> {
        let idx: Vec<usize> = ids.iter().filter_map(|id| self.row_index(*id)).collect();
        self.values.select(Axis(0), &idx)
    }

    /// Per-column median over the rows in `ids`.
    pub fn medians(&self, ids: &BTreeSet<BodyId>) -> Array1<f64> {
        let rows = self.select_rows(ids);
        rows.axis_iter(Axis(1))
            .map(|col| median(col.iter().copied()))
            .collect()
    }
}

/// Median of the values; the mean of the two middle values for an even
/// count, 0 when empty.
pub fn median(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut v: Vec<f64> = values.into_iter().collect();
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 { (v[mid - 1] + v[mid]) / 2.0 } else { v[mid] }
}

/// Rank partner types across the reference set.
///
/// All important connections of the reference neurons go into one queue
/// sorted descending by (weight, partner id, neuron id). Walking the queue,
/// each connection not yet claimed opens a column, and claims the first
/// unclaimed connection with the same partner key in every reference
/// neuron (its own included), so one column absorbs one connection per
/// neuron.
pub fn rank_partner_types(lists: &RankedLists, working: &BTreeSet<BodyId>) -> Vec<RankedPartner> {
    let mut queue: Vec<(u64, BodyId, BodyId, usize)> = Vec::new();
    for id in working {
        for (idx, conn) in list_for(lists, *id).important().iter().enumerate() {
            queue.push((conn.weight, conn.partner_id, *id, idx));
        }
    }
    queue.sort_by_key(|&(weight, partner, neuron, _)| Reverse((weight, partner, neuron)));

    let mut claimed: BTreeMap<BodyId, Vec<bool>> = working
        .iter()
        .map(|id| (*id, vec![false; list_for(lists, *id).connections.len()]))
        .collect();

    let mut ranked = Vec::new();
    for (weight, _, neuron, idx) in queue {
        if claimed.get(&neuron).is_some_and(|flags| flags[idx]) {
            continue;
        }
        let entry = &list_for(lists, neuron).connections[idx];
        ranked.push(RankedPartner {
            partner: entry.partner.clone(),
            weight,
            has_type: entry.has_type,
        });

        for (id, flags) in claimed.iter_mut() {
            let hit = list_for(lists, *id)
                .connections
                .iter()
                .enumerate()
                .position(|(i, c)| !flags[i] && c.key() == entry.key());
            if let Some(i) = hit {
                flags[i] = true;
            }
        }
    }
    ranked
}

/// Project every neuron onto the ranked columns.
///
/// Each neuron's surviving connections are pooled by partner key; every
/// column takes the next weight from its key's pool (strongest first) or 0
/// once the pool is exhausted.
pub fn project(lists: &RankedLists, neurons: &[BodyId], columns: Vec<RankedPartner>) -> FeatureTable {
    let mut values = Array2::<f64>::zeros((neurons.len(), columns.len()));

    for (row, id) in neurons.iter().enumerate() {
        let mut pool: HashMap<(&str, bool), VecDeque<u64>> = HashMap::new();
        if let Some(list) = lists.get(id) {
            for conn in &list.connections {
                pool.entry(conn.key()).or_default().push_back(conn.weight);
            }
        }
        for (col, column) in columns.iter().enumerate() {
            let key = (column.partner.as_str(), column.has_type);
            if let Some(weight) = pool.get_mut(&key).and_then(VecDeque::pop_front) {
                values[[row, col]] = weight as f64;
            }
        }
    }

    FeatureTable {
        neurons: neurons.to_vec(),
        columns,
        values,
    }
}

/// Rank the reference set's partner types and project all neurons onto them.
pub fn build_feature_table(
    lists: &RankedLists,
    neurons: &[BodyId],
    working: &BTreeSet<BodyId>,
) -> FeatureTable {
    let columns = rank_partner_types(lists, working);
    let table = project(lists, neurons, columns);
    tracing::debug!(rows = table.neurons.len(), columns = table.num_columns(), "built feature table");
    table
}
