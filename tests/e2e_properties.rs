//! Property tests over randomly generated connectivity.

use std::collections::BTreeMap;

use celltype_rs::analysis::{self, importance, ledger::ConnectionLedger};
use celltype_rs::export::report_to_json;
use celltype_rs::{AnalysisConfig, BodyId, ConnectionRow};
use proptest::prelude::*;

const PARTNER_TYPES: [Option<&str>; 4] = [Some("KC"), Some("APL"), Some("DAN"), None];

fn make_row(body: u64, partner: u64, is_output: bool, weight: u64) -> ConnectionRow {
    ConnectionRow {
        body_id: BodyId(body),
        instance: Some(if body % 3 == 0 { format!("T{body}_L") } else { format!("T{body}_R") }),
        weight,
        partner_id: BodyId(100 + partner),
        partner_type: PARTNER_TYPES[(partner % 4) as usize].map(Into::into),
        is_output,
        status: Some("Traced".into()),
        partner_status: Some(if partner % 5 == 0 { "Leaves" } else { "Traced" }.into()),
    }
}

/// Rows unique per (body, partner, direction), in generation order.
fn arb_rows() -> impl Strategy<Value = Vec<ConnectionRow>> {
    prop::collection::vec((1u64..=5, 0u64..16, any::<bool>(), 1u64..80), 1..60).prop_map(|raw| {
        let mut unique = BTreeMap::new();
        for (body, partner, is_output, weight) in raw {
            unique.entry((body, partner, is_output)).or_insert(weight);
        }
        unique
            .into_iter()
            .map(|((body, partner, is_output), weight)| make_row(body, partner, is_output, weight))
            .collect()
    })
}

/// True when every element of `part` can be paired with a distinct element of `whole`.
fn is_submultiset(part: &[u64], whole: &[u64]) -> bool {
    let mut counts: BTreeMap<u64, i64> = BTreeMap::new();
    for w in whole {
        *counts.entry(*w).or_default() += 1;
    }
    part.iter().all(|w| {
        let c = counts.entry(*w).or_default();
        *c -= 1;
        *c >= 0
    })
}

proptest! {
    #[test]
    fn prop_lists_sorted_with_minimum_importance(rows in arb_rows()) {
        let config = AnalysisConfig::default();
        let ledger = ConnectionLedger::build(&rows, &config).unwrap();
        for lists in [&ledger.inputs, &ledger.outputs] {
            for list in importance::rank_all(lists, &config).values() {
                let keys: Vec<_> = list.connections.iter().map(|c| (c.weight, c.partner_id)).collect();
                prop_assert!(keys.windows(2).all(|w| w[0] > w[1]));
                prop_assert!(list.important >= config.min_important.min(list.connections.len()));
                prop_assert!(list.important <= list.connections.len());
            }
        }
    }

    #[test]
    fn prop_distance_matrix_is_symmetric(rows in arb_rows()) {
        let report = analysis::run(&rows, &AnalysisConfig::default()).unwrap();
        if let Some(dist) = &report.distances {
            let n = dist.nrows();
            prop_assert_eq!(n, report.neurons.len());
            for i in 0..n {
                prop_assert_eq!(dist[[i, i]], 0.0);
                for j in 0..n {
                    prop_assert_eq!(dist[[i, j]], dist[[j, i]]);
                    prop_assert!(dist[[i, j]] >= 0.0);
                }
            }
            let expected = dist.sum() / (n * n - n) as f64;
            prop_assert_eq!(report.average_distance, Some(expected));
        } else {
            prop_assert!(report.neurons.len() < 2);
        }
    }

    #[test]
    fn prop_row_order_does_not_matter(rows in arb_rows()) {
        let config = AnalysisConfig::default();
        let forward = analysis::run(&rows, &config).unwrap();
        let reversed: Vec<ConnectionRow> = rows.iter().rev().cloned().collect();
        let backward = analysis::run(&reversed, &config).unwrap();
        prop_assert_eq!(report_to_json(&forward), report_to_json(&backward));
        prop_assert_eq!(forward.centroid, backward.centroid);
    }

    #[test]
    fn prop_reference_rows_cover_important_weights(rows in arb_rows()) {
        let config = AnalysisConfig::default();
        let ledger = ConnectionLedger::build(&rows, &config).unwrap();
        let lists = importance::rank_all(&ledger.inputs, &config);
        let report = analysis::run(&rows, &config).unwrap();
        let Some(inputs) = &report.inputs else {
            prop_assert!(report.is_empty());
            return Ok(());
        };

        for id in &report.reference {
            let list = importance::list_for(&lists, *id);
            let important: Vec<u64> = list.important().iter().map(|c| c.weight).collect();
            let surviving: Vec<u64> = list.connections.iter().map(|c| c.weight).collect();
            let row: Vec<u64> = inputs
                .features
                .row(*id)
                .unwrap()
                .iter()
                .filter(|v| **v > 0.0)
                .map(|v| *v as u64)
                .collect();
            prop_assert!(is_submultiset(&important, &row));
            prop_assert!(is_submultiset(&row, &surviving));
        }
    }

    #[test]
    fn prop_centroid_is_a_reference_neuron(rows in arb_rows()) {
        let report = analysis::run(&rows, &AnalysisConfig::default()).unwrap();
        match report.centroid {
            Some(id) => prop_assert!(report.reference.contains(&id)),
            None => prop_assert!(report.is_empty()),
        }
        let again = analysis::run(&rows, &AnalysisConfig::default()).unwrap();
        prop_assert_eq!(report.centroid, again.centroid);
    }
}
