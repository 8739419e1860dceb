//! Importance selection.
//!
//! Each directional list is sorted strongest-first and the leading run of
//! connections that carries the bulk of the neuron's weight is marked
//! important. Marking stops at the first connection that fails the
//! threshold, so the important connections are always a prefix.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::model::BodyId;

use super::ledger::{Connection, ConnectionLists};

/// A sorted connection list with its important prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedList {
    /// Sorted descending by (weight, partner id).
    pub connections: Vec<Connection>,
    /// Length of the important prefix.
    pub important: usize,
}

impl RankedList {
    pub fn important(&self) -> &[Connection] {
        &self.connections[..self.important]
    }
}

pub type RankedLists = BTreeMap<BodyId, RankedList>;

static EMPTY: RankedList = RankedList { connections: Vec::new(), important: 0 };

/// The neuron's list, or an empty one if it kept no connections.
pub fn list_for(lists: &RankedLists, id: BodyId) -> &RankedList {
    lists.get(&id).unwrap_or(&EMPTY)
}

/// Number of leading weights marked important.
///
/// The threshold is set by the first connection whose running sum passes
/// `cutoff` of the total, minus its square root as an error margin. Once
/// `min_important` connections are marked, the first weight under the
/// threshold ends the run. A zero total never sets a threshold.
pub fn important_prefix(weights: &[u64], cutoff: f64, min_important: usize) -> usize {
    let total: u64 = weights.iter().sum();
    let limit = total as f64 * cutoff;

    let mut running = 0u64;
    let mut threshold: Option<f64> = None;
    let mut marked = 0usize;
    for &w in weights {
        if marked >= min_important && threshold.is_some_and(|t| (w as f64) < t) {
            break;
        }
        marked += 1;
        running += w;
        if threshold.is_none() && running as f64 > limit {
            let w = w as f64;
            threshold = Some(w - w.sqrt());
        }
    }
    marked
}

/// Sort one list and mark its important prefix.
pub fn rank_connections(list: &[Connection], config: &AnalysisConfig) -> RankedList {
    let mut connections = list.to_vec();
    connections.sort_by_key(|c| (Reverse(c.weight), Reverse(c.partner_id)));
    let weights: Vec<u64> = connections.iter().map(|c| c.weight).collect();
    let important = important_prefix(&weights, config.importance_cutoff, config.min_important);
    RankedList { connections, important }
}

/// Rank every neuron's list for one direction.
pub fn rank_all(lists: &ConnectionLists, config: &AnalysisConfig) -> RankedLists {
    lists
        .iter()
        .map(|(id, list)| (*id, rank_connections(list, config)))
        .collect()
}
