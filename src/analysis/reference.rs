//! Reference (working) set resolution.

use std::collections::BTreeSet;

use crate::config::AnalysisConfig;
use crate::model::BodyId;

use super::ledger::{ConnectionLedger, NeuronInfo};

/// Pick the neurons that define the group statistics.
///
/// Starts from the neurons flagged as reference while building the ledger.
/// An empty flag set falls back to every analyzed neuron. With
/// `reference_size_fraction` set, members smaller than that fraction of the
/// largest member (input + output size) are dropped.
pub fn resolve_reference_set(ledger: &ConnectionLedger, config: &AnalysisConfig) -> BTreeSet<BodyId> {
    let neurons = &ledger.neurons;
    let mut working = ledger.good_neurons();
    if working.is_empty() {
        tracing::debug!("no reference neurons; using all {} neurons", neurons.len());
        working = neurons.keys().copied().collect();
    }

    if let Some(fraction) = config.reference_size_fraction {
        let size = |id: &BodyId| neurons.get(id).map_or(0, NeuronInfo::total_size);
        let max = working.iter().map(size).max().unwrap_or(0);
        let floor = max as f64 * fraction;
        let before = working.len();
        working.retain(|id| size(id) as f64 >= floor);
        tracing::debug!(before, after = working.len(), floor, "applied reference size filter");
    }

    working
}
