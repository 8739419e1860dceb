//! Connection ledger: splits query rows into per-neuron input and output
//! lists and keeps the size/completeness bookkeeping for every analyzed
//! neuron.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::model::{BodyId, ConnectionRow, Direction};
use crate::Result;

/// One surviving connection of a neuron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub weight: u64,
    pub partner_id: BodyId,
    /// Partner cell type, or the partner body id when untyped.
    pub partner: String,
    pub has_type: bool,
}

impl Connection {
    /// Key used to line connections up against feature columns.
    pub fn key(&self) -> (&str, bool) {
        (&self.partner, self.has_type)
    }
}

/// Per-neuron bookkeeping reported as `neuroninfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NeuronInfo {
    pub input_size: u64,
    pub output_size: u64,
    pub input_comp: u64,
    pub output_comp: u64,
    pub reference: bool,
    pub instance_name: String,
}

impl NeuronInfo {
    pub fn total_size(&self) -> u64 {
        self.input_size + self.output_size
    }
}

/// Directional connection lists keyed by neuron.
pub type ConnectionLists = BTreeMap<BodyId, Vec<Connection>>;

/// Everything the rest of the pipeline needs from the raw rows.
#[derive(Debug, Clone, Default)]
pub struct ConnectionLedger {
    /// Every neuron whose own status is at least Leaves.
    pub neurons: BTreeMap<BodyId, NeuronInfo>,
    pub inputs: ConnectionLists,
    pub outputs: ConnectionLists,
}

impl ConnectionLedger {
    /// Build the ledger from raw query rows.
    pub fn build(rows: &[ConnectionRow], config: &AnalysisConfig) -> Result<Self> {
        let exclusion = config.exclusion_regex()?;
        let mut ledger = ConnectionLedger::default();

        for row in rows {
            if !row.status().is_primary() {
                continue;
            }
            let instance = row.instance.clone().unwrap_or_default();
            let info = ledger.neurons.entry(row.body_id).or_default();
            info.instance_name = instance;

            let direction = row.direction();
            match direction {
                Direction::Input => info.input_size += row.weight,
                Direction::Output => info.output_size += row.weight,
            }

            let partner_status = row.partner_status();
            if !partner_status.is_primary() {
                continue;
            }
            match direction {
                Direction::Input => info.input_comp += row.weight,
                Direction::Output => info.output_comp += row.weight,
            }

            let (partner, has_type) = row.partner_label();
            // Untyped partners only count once they are traced.
            if !has_type && !partner_status.is_connection_grade() {
                continue;
            }
            if row.weight < config.min_weight {
                continue;
            }

            if row.status().is_connection_grade() && !exclusion.is_match(&info.instance_name) {
                info.reference = true;
            }

            let conn = Connection {
                weight: row.weight,
                partner_id: row.partner_id,
                partner,
                has_type,
            };
            match direction {
                Direction::Input => ledger.inputs.entry(row.body_id).or_default().push(conn),
                Direction::Output => ledger.outputs.entry(row.body_id).or_default().push(conn),
            }
        }

        tracing::debug!(
            rows = rows.len(),
            neurons = ledger.neurons.len(),
            reference = ledger.neurons.values().filter(|n| n.reference).count(),
            "built connection ledger"
        );
        Ok(ledger)
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Neurons that qualified for the reference set while building.
    pub fn good_neurons(&self) -> BTreeSet<BodyId> {
        self.neurons
            .iter()
            .filter(|(_, info)| info.reference)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(body: u64, partner: u64, weight: u64, is_output: bool) -> ConnectionRow {
        ConnectionRow {
            body_id: BodyId(body),
            instance: Some(format!("N{body}_R")),
            weight,
            partner_id: BodyId(partner),
            partner_type: Some(format!("T{partner}")),
            is_output,
            status: Some("Traced".into()),
            partner_status: Some("Traced".into()),
        }
    }

    #[test]
    fn test_untraced_neuron_is_dropped() {
        let mut r = row(1, 2, 10, false);
        r.status = Some("Orphan".into());
        let ledger = ConnectionLedger::build(&[r], &AnalysisConfig::default()).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_weak_connection_counts_towards_size_only() {
        let rows = vec![row(1, 2, 2, false), row(1, 3, 10, false)];
        let ledger = ConnectionLedger::build(&rows, &AnalysisConfig::default()).unwrap();
        let info = &ledger.neurons[&BodyId(1)];
        assert_eq!(info.input_size, 12);
        assert_eq!(info.input_comp, 12);
        assert_eq!(ledger.inputs[&BodyId(1)].len(), 1);
        assert_eq!(ledger.inputs[&BodyId(1)][0].weight, 10);
    }

    #[test]
    fn test_partner_below_leaves_is_size_only() {
        let mut r = row(1, 2, 10, true);
        r.partner_status = None;
        let ledger = ConnectionLedger::build(&[r], &AnalysisConfig::default()).unwrap();
        let info = &ledger.neurons[&BodyId(1)];
        assert_eq!(info.output_size, 10);
        assert_eq!(info.output_comp, 0);
        assert!(ledger.outputs.is_empty());
        assert!(!info.reference);
    }

    #[test]
    fn test_untyped_leaves_partner_is_skipped() {
        let mut leaves = row(1, 2, 10, false);
        leaves.partner_type = None;
        leaves.partner_status = Some("Leaves".into());
        let mut traced = row(1, 3, 10, false);
        traced.partner_type = None;
        let ledger = ConnectionLedger::build(&[leaves, traced], &AnalysisConfig::default()).unwrap();
        let list = &ledger.inputs[&BodyId(1)];
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].partner, "3");
        assert!(!list[0].has_type);
        assert_eq!(ledger.neurons[&BodyId(1)].input_comp, 20);
    }

    #[test]
    fn test_left_instances_are_not_reference() {
        let mut left = row(1, 2, 10, false);
        left.instance = Some("N1_L".into());
        let right = row(2, 2, 10, false);
        let mut leaves = row(3, 2, 10, false);
        leaves.status = Some("Leaves".into());
        let ledger = ConnectionLedger::build(&[left, right, leaves], &AnalysisConfig::default()).unwrap();
        assert_eq!(ledger.good_neurons(), BTreeSet::from([BodyId(2)]));
        assert_eq!(ledger.neurons.len(), 3);
    }
}
