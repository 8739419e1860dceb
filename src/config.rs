//! Analysis and source configuration.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// Analysis thresholds
// ============================================================================

/// Thresholds that drive the canonical cell-type pipeline.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides. Values are not range-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Connections weaker than this are left out of the feature tables.
    pub min_weight: u64,
    /// Fraction of a neuron's directional weight that sets the importance
    /// threshold.
    pub importance_cutoff: f64,
    /// Number of connections marked important before the threshold applies.
    pub min_important: usize,
    /// Synapse count error reasonably possible from proofreading.
    pub tracing_accuracy: f64,
    /// Ratio band for a good match: the group weight must lie strictly
    /// between `w * match_cutoff` and `w / match_cutoff`.
    pub match_cutoff: f64,
    /// Instance names matching this pattern are kept out of the reference set.
    pub name_exclusion: String,
    /// When set, reference neurons whose total size is below this fraction
    /// of the largest reference neuron are dropped from the reference set.
    pub reference_size_fraction: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_weight: 3,
            importance_cutoff: 0.25,
            min_important: 6,
            tracing_accuracy: 5.0,
            match_cutoff: 0.5,
            name_exclusion: ".*_L".into(),
            reference_size_fraction: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse a JSON config document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(format!("invalid analysis config: {e}")))
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Compile the instance-name exclusion pattern.
    pub fn exclusion_regex(&self) -> Result<Regex> {
        Regex::new(&self.name_exclusion)
            .map_err(|e| Error::Config(format!("invalid name exclusion {:?}: {e}", self.name_exclusion)))
    }

    /// True when `g` and `w` agree within the ratio band or the tracing
    /// tolerance.
    pub fn is_good_match(&self, group: f64, weight: f64) -> bool {
        let in_band = group > weight * self.match_cutoff && group * self.match_cutoff < weight;
        in_band || (group - weight).abs() <= self.tracing_accuracy
    }
}

// ============================================================================
// Source configuration
// ============================================================================

/// Where connection rows come from.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    /// JSON array of query rows exported from neuPrint.
    RowsFile { path: PathBuf },
}
