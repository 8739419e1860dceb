//! # Canonical Cell-Type Analysis
//!
//! Turns the connectivity rows of one cell type into group statistics:
//!
//! ```text
//! rows → ledger → importance → reference set → feature tables
//!      → embedding (centroid, distances) → matches against group medians
//! ```
//!
//! Every stage is a pure function of the previous stage's output; nothing is
//! mutated across stages.

pub mod ledger;
pub mod importance;
pub mod reference;
pub mod features;
pub mod distance;
pub mod matcher;

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array1, Array2};

use crate::config::AnalysisConfig;
use crate::model::{BodyId, ConnectionRow, Direction};
use crate::Result;

pub use ledger::{Connection, ConnectionLedger, NeuronInfo};
pub use importance::{RankedList, RankedLists};
pub use features::{FeatureTable, RankedPartner};
pub use distance::Embedding;
pub use matcher::{ConnectionMatch, MissedFeature, NeuronMatches};

/// Group statistics for one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionReport {
    pub features: FeatureTable,
    /// Per-column median over the reference set.
    pub medians: Array1<f64>,
    /// Keyed by every neuron that kept connections in this direction.
    pub matches: BTreeMap<BodyId, NeuronMatches>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellTypeReport {
    pub neurons: BTreeMap<BodyId, NeuronInfo>,
    pub reference: BTreeSet<BodyId>,
    pub centroid: Option<BodyId>,
    pub inputs: Option<DirectionReport>,
    pub outputs: Option<DirectionReport>,
    /// Present with at least two neurons.
    pub distances: Option<Array2<f64>>,
    pub average_distance: Option<f64>,
}

impl CellTypeReport {
    /// True when no neuron survived filtering.
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn direction(&self, dir: Direction) -> Option<&DirectionReport> {
        match dir {
            Direction::Input => self.inputs.as_ref(),
            Direction::Output => self.outputs.as_ref(),
        }
    }
}

/// Run the whole pipeline over the rows of one cell type.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn run(rows: &[ConnectionRow], config: &AnalysisConfig) -> Result<CellTypeReport> {
    let ledger = ConnectionLedger::build(rows, config)?;
    if ledger.is_empty() {
        tracing::info!("no analyzable neurons");
        return Ok(CellTypeReport::default());
    }

    let reference = reference::resolve_reference_set(&ledger, config);
    let neurons: Vec<BodyId> = ledger.neurons.keys().copied().collect();

    let input_lists = importance::rank_all(&ledger.inputs, config);
    let output_lists = importance::rank_all(&ledger.outputs, config);
    let input_table = features::build_feature_table(&input_lists, &neurons, &reference);
    let output_table = features::build_feature_table(&output_lists, &neurons, &reference);

    let embedding = Embedding::from_tables(&input_table, &output_table)?;
    let centroid = embedding.centroid(&reference);
    let (distances, average_distance) = if embedding.len() >= 2 {
        let dist = embedding.distance_matrix();
        let avg = distance::average_distance(&dist);
        (Some(dist), avg)
    } else {
        (None, None)
    };

    let inputs = direction_report(&input_lists, input_table, &reference, config);
    let outputs = direction_report(&output_lists, output_table, &reference, config);

    tracing::info!(
        neurons = neurons.len(),
        reference = reference.len(),
        input_columns = inputs.features.num_columns(),
        output_columns = outputs.features.num_columns(),
        centroid = ?centroid,
        "cell type analyzed"
    );

    Ok(CellTypeReport {
        neurons: ledger.neurons,
        reference,
        centroid,
        inputs: Some(inputs),
        outputs: Some(outputs),
        distances,
        average_distance,
    })
}

fn direction_report(
    lists: &RankedLists,
    features: FeatureTable,
    reference: &BTreeSet<BodyId>,
    config: &AnalysisConfig,
) -> DirectionReport {
    let medians = features.medians(reference);
    let matches = matcher::match_all(lists, &features.columns, &medians, config);
    DirectionReport { features, medians, matches }
}
