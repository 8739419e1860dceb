//! Matching individual neurons against the reference group.
//!
//! The group baseline is the per-column median of the feature table over
//! the reference set. Each neuron's connections claim columns of the same
//! partner type strongest-first; the important ones are reported with the
//! group weight they were paired with, and columns the neuron leaves
//! conspicuously unfilled are reported as missed.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use ndarray::Array1;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::model::BodyId;

use super::features::RankedPartner;
use super::importance::{RankedList, RankedLists};

/// One important connection compared with the group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionMatch {
    pub partner: String,
    pub neuron_weight: u64,
    /// Median of the column the connection was paired with, 0 if none.
    pub group_weight: f64,
    pub good_match: bool,
}

/// A group feature the neuron lacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissedFeature {
    pub partner: String,
    pub group_weight: f64,
    /// Group weight of the column when some connection was paired with it,
    /// otherwise 0.
    pub neuron_weight: f64,
}

/// Match report for one neuron and direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NeuronMatches {
    pub matches: Vec<ConnectionMatch>,
    pub missed: Vec<MissedFeature>,
}

/// Compare one neuron's list against the group medians.
///
/// Every connection, important or not, is offered in list order: it takes
/// the first unclaimed column of its partner type that is a good match, or
/// failing that the first unclaimed column of that type.
pub fn match_neuron(
    list: &RankedList,
    columns: &[RankedPartner],
    medians: &Array1<f64>,
    config: &AnalysisConfig,
) -> NeuronMatches {
    let mut by_partner: HashMap<&str, Vec<usize>> = HashMap::new();
    for (fid, column) in columns.iter().enumerate() {
        by_partner.entry(column.partner.as_str()).or_default().push(fid);
    }

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut paired: HashMap<usize, f64> = HashMap::new();
    let mut group_weights = Vec::with_capacity(list.connections.len());

    for conn in &list.connections {
        let weight = conn.weight as f64;
        let mut choice: Option<(usize, f64)> = None;
        let candidates = by_partner.get(conn.partner.as_str()).map_or(&[][..], Vec::as_slice);
        for &fid in candidates {
            if claimed.contains(&fid) {
                continue;
            }
            let group = medians[fid];
            if choice.is_none() {
                choice = Some((fid, group));
            }
            if config.is_good_match(group, weight) {
                choice = Some((fid, group));
                break;
            }
        }

        match choice {
            Some((fid, group)) => {
                claimed.insert(fid);
                paired.insert(fid, group);
                group_weights.push(group);
            }
            None => group_weights.push(0.0),
        }
    }

    let matches = list
        .important()
        .iter()
        .zip(&group_weights)
        .map(|(conn, &group)| ConnectionMatch {
            partner: conn.partner.clone(),
            neuron_weight: conn.weight,
            group_weight: group,
            good_match: config.is_good_match(group, conn.weight as f64),
        })
        .collect();

    let missed = columns
        .iter()
        .zip(medians.iter())
        .enumerate()
        .filter_map(|(fid, (column, &group))| {
            let matched = paired.get(&fid).copied().unwrap_or(0.0);
            let lacking = group * config.match_cutoff >= matched
                && group > matched + config.tracing_accuracy;
            lacking.then(|| MissedFeature {
                partner: column.partner.clone(),
                group_weight: group,
                neuron_weight: matched,
            })
        })
        .collect();

    NeuronMatches { matches, missed }
}

/// Match every neuron that kept connections in this direction.
pub fn match_all(
    lists: &RankedLists,
    columns: &[RankedPartner],
    medians: &Array1<f64>,
    config: &AnalysisConfig,
) -> BTreeMap<BodyId, NeuronMatches> {
    lists
        .iter()
        .map(|(id, list)| (*id, match_neuron(list, columns, medians, config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ledger::Connection;
    use ndarray::array;

    fn conn(weight: u64, partner: u64, ty: &str) -> Connection {
        Connection {
            weight,
            partner_id: BodyId(partner),
            partner: ty.into(),
            has_type: true,
        }
    }

    fn column(ty: &str) -> RankedPartner {
        RankedPartner { partner: ty.into(), weight: 0, has_type: true }
    }

    #[test]
    fn test_matching_weight_is_good() {
        let list = RankedList { connections: vec![conn(20, 1, "A"), conn(12, 2, "B")], important: 2 };
        let columns = vec![column("A"), column("B")];
        let report = match_neuron(&list, &columns, &array![22.0, 40.0], &AnalysisConfig::default());
        assert_eq!(report.matches.len(), 2);
        assert!(report.matches[0].good_match);
        assert_eq!(report.matches[0].group_weight, 22.0);
        // 40 is more than double 12 and more than 5 away.
        assert!(!report.matches[1].good_match);
        assert_eq!(report.matches[1].group_weight, 40.0);
        // B was paired, so it is not missed.
        assert!(report.missed.is_empty());
    }

    #[test]
    fn test_good_column_is_preferred_over_first() {
        let list = RankedList { connections: vec![conn(10, 1, "A")], important: 1 };
        let columns = vec![column("A"), column("A")];
        let report = match_neuron(&list, &columns, &array![50.0, 11.0], &AnalysisConfig::default());
        assert_eq!(report.matches[0].group_weight, 11.0);
        assert!(report.matches[0].good_match);
        assert_eq!(report.missed.len(), 1);
        assert_eq!(report.missed[0].group_weight, 50.0);
        assert_eq!(report.missed[0].neuron_weight, 0.0);
    }

    #[test]
    fn test_columns_are_claimed_once() {
        let list = RankedList { connections: vec![conn(30, 1, "A"), conn(28, 2, "A")], important: 2 };
        let columns = vec![column("A")];
        let report = match_neuron(&list, &columns, &array![30.0], &AnalysisConfig::default());
        assert_eq!(report.matches[0].group_weight, 30.0);
        assert_eq!(report.matches[1].group_weight, 0.0);
        assert!(!report.matches[1].good_match);
    }

    #[test]
    fn test_unimportant_connections_still_claim_columns() {
        let list = RankedList { connections: vec![conn(30, 1, "A"), conn(8, 2, "B")], important: 1 };
        let columns = vec![column("A"), column("B")];
        let report = match_neuron(&list, &columns, &array![30.0, 8.0], &AnalysisConfig::default());
        assert_eq!(report.matches.len(), 1);
        assert!(report.missed.is_empty());
    }

    #[test]
    fn test_small_group_weights_are_not_missed() {
        let list = RankedList::default();
        let columns = vec![column("A"), column("B")];
        let report = match_neuron(&list, &columns, &array![5.0, 6.0], &AnalysisConfig::default());
        let missed: Vec<&str> = report.missed.iter().map(|m| m.partner.as_str()).collect();
        assert_eq!(missed, vec!["B"]);
    }
}
