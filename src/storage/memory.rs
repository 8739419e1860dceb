//! In-memory connection source.
//!
//! Holds one small connectome per dataset: neurons keyed by body id,
//! `ConnectsTo` edges and an adjacency list. Maps are guarded by `RwLock`
//! so the source can be shared across tasks.
//!
//! Use this source for:
//! - Testing the analysis pipeline end to end
//! - Embedding the analysis over a connectome already loaded in memory

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::model::*;
use crate::{Error, Result};
use super::ConnectionSource;

// ============================================================================
// MemorySource
// ============================================================================

/// In-memory connectome storage.
#[derive(Clone, Default)]
pub struct MemorySource {
    inner: Arc<RwLock<HashMap<String, Connectome>>>,
}

#[derive(Default)]
struct Connectome {
    neurons: HashMap<BodyId, Neuron>,
    synapses: Vec<Synapse>,
    /// body id → indices into `synapses`
    adjacency: HashMap<BodyId, Vec<usize>>,
    /// cell type → body ids (poor man's type index)
    type_index: HashMap<String, Vec<BodyId>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a neuron.
    pub fn add_neuron(&self, dataset: &str, neuron: Neuron) {
        let mut datasets = self.inner.write();
        let graph = datasets.entry(dataset.to_string()).or_default();

        if let Some(old) = graph.neurons.get(&neuron.id) {
            if let Some(ids) = old.cell_type.as_ref().and_then(|t| graph.type_index.get_mut(t)) {
                ids.retain(|id| *id != neuron.id);
            }
        }
        if let Some(t) = &neuron.cell_type {
            graph.type_index.entry(t.clone()).or_default().push(neuron.id);
        }
        graph.adjacency.entry(neuron.id).or_default();
        graph.neurons.insert(neuron.id, neuron);
    }

    /// Add a `ConnectsTo` edge. Both endpoints must already exist.
    pub fn add_synapse(&self, dataset: &str, synapse: Synapse) -> Result<()> {
        let mut datasets = self.inner.write();
        let graph = datasets
            .get_mut(dataset)
            .ok_or_else(|| Error::NotFound(format!("Dataset {dataset}")))?;

        for end in [synapse.pre, synapse.post] {
            if !graph.neurons.contains_key(&end) {
                return Err(Error::NotFound(format!("Neuron {end} in {dataset}")));
            }
        }

        let idx = graph.synapses.len();
        graph.synapses.push(synapse);
        graph.adjacency.entry(synapse.pre).or_default().push(idx);
        if synapse.pre != synapse.post {
            graph.adjacency.entry(synapse.post).or_default().push(idx);
        }
        Ok(())
    }

    pub fn neuron_count(&self, dataset: &str) -> usize {
        self.inner.read().get(dataset).map_or(0, |g| g.neurons.len())
    }

    pub fn synapse_count(&self, dataset: &str) -> usize {
        self.inner.read().get(dataset).map_or(0, |g| g.synapses.len())
    }
}

impl Connectome {
    fn row(&self, neuron: &Neuron, synapse: &Synapse, is_output: bool) -> ConnectionRow {
        let partner_id = if is_output { synapse.post } else { synapse.pre };
        let partner = self.neurons.get(&partner_id);
        ConnectionRow {
            body_id: neuron.id,
            instance: neuron.instance.clone(),
            weight: synapse.weight,
            partner_id,
            partner_type: partner.and_then(|p| p.cell_type.clone()),
            is_output,
            status: neuron.status.clone(),
            partner_status: partner.and_then(|p| p.status.clone()),
        }
    }
}

// ============================================================================
// ConnectionSource impl
// ============================================================================

#[async_trait]
impl ConnectionSource for MemorySource {
    async fn fetch_connections(&self, dataset: &str, cell_type: &str) -> Result<Vec<ConnectionRow>> {
        let datasets = self.inner.read();
        let Some(graph) = datasets.get(dataset) else {
            return Ok(Vec::new());
        };

        let mut ids = graph.type_index.get(cell_type).cloned().unwrap_or_default();
        ids.sort();

        let mut rows = Vec::new();
        for id in ids {
            let Some(neuron) = graph.neurons.get(&id) else { continue };
            for &idx in graph.adjacency.get(&id).map_or(&[][..], Vec::as_slice) {
                let synapse = &graph.synapses[idx];
                // An autapse is both an input and an output of the neuron.
                if synapse.pre == id {
                    rows.push(graph.row(neuron, synapse, true));
                }
                if synapse.post == id {
                    rows.push(graph.row(neuron, synapse, false));
                }
            }
        }

        tracing::debug!(dataset, cell_type, rows = rows.len(), "fetched connections");
        Ok(rows)
    }

    async fn datasets(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

// ============================================================================
// Tests
// ============================================================================
