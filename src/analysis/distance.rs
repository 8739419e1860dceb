//! Normalization, centroid selection and pairwise distances.

use std::collections::BTreeSet;

use ndarray::{concatenate, Array1, Array2, Axis};

use crate::model::BodyId;
use crate::Result;

use super::features::FeatureTable;

/// Weight that maps to 0.5 under [`squash`]. Roughly the connection count
/// below which tracing noise dominates.
pub const SQUASH_CENTER: f64 = 17.0;
pub const SQUASH_SCALE: f64 = 20.0;

/// Sigmoid compression of a raw weight.
pub fn squash(x: f64) -> f64 {
    1.0 / (1.0 + (-(x - SQUASH_CENTER) / SQUASH_SCALE).exp())
}

/// Squash every cell and scale each row to unit L2 norm. All-zero rows stay
/// zero.
pub fn normalize_rows(values: &Array2<f64>) -> Array2<f64> {
    let mut out = values.mapv(squash);
    for mut row in out.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    out
}

/// Normalized feature vectors for every neuron.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// Row labels, ascending body id.
    pub neurons: Vec<BodyId>,
    pub vectors: Array2<f64>,
}

impl Embedding {
    /// Concatenate the normalized input and output halves, each scaled by
    /// `sqrt(0.5)`. A direction without columns adds nothing.
    pub fn from_tables(inputs: &FeatureTable, outputs: &FeatureTable) -> Result<Self> {
        let half = 0.5f64.sqrt();
        let ins = normalize_rows(&inputs.values) * half;
        let outs = normalize_rows(&outputs.values) * half;
        let vectors = concatenate(Axis(1), &[ins.view(), outs.view()])?;
        Ok(Self {
            neurons: inputs.neurons.clone(),
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Reference member closest (squared Euclidean) to the reference mean.
    /// The first in id order wins ties.
    pub fn centroid(&self, working: &BTreeSet<BodyId>) -> Option<BodyId> {
        let rows: Vec<usize> = self
            .neurons
            .iter()
            .enumerate()
            .filter(|(_, id)| working.contains(id))
            .map(|(i, _)| i)
            .collect();
        let members = self.vectors.select(Axis(0), &rows);
        let mean: Array1<f64> = members.mean_axis(Axis(0))?;

        let mut best: Option<(BodyId, f64)> = None;
        for (&row, member) in rows.iter().zip(members.rows()) {
            let diff = &member - &mean;
            let score = diff.dot(&diff);
            if best.is_none_or(|(_, s)| score < s) {
                best = Some((self.neurons[row], score));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Symmetric Euclidean distance matrix with a zero diagonal.
    ///
    /// Squared distances come from the Gram matrix,
    /// `|a|^2 + |b|^2 - 2 a.b`. Only the upper triangle is computed and then
    /// mirrored. Identical rows are set to exactly 0, since the Gram form
    /// leaves rounding residue there.
    pub fn distance_matrix(&self) -> Array2<f64> {
        let n = self.len();
        let gram = self.vectors.dot(&self.vectors.t());
        let mut dist = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let d = if self.vectors.row(i) == self.vectors.row(j) {
                    0.0
                } else {
                    (gram[[i, i]] + gram[[j, j]] - 2.0 * gram[[i, j]]).max(0.0).sqrt()
                };
                dist[[i, j]] = d;
                dist[[j, i]] = d;
            }
        }
        dist
    }
}

/// Mean off-diagonal distance, `sum / (n^2 - n)`. `None` below two neurons.
pub fn average_distance(dist: &Array2<f64>) -> Option<f64> {
    let n = dist.nrows();
    if n < 2 {
        return None;
    }
    Some(dist.sum() / (n * n - n) as f64)
}
