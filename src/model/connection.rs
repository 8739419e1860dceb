//! Weighted connections between bodies.

use serde::{Deserialize, Serialize};

use super::{BodyId, NeuronStatus};

/// Which side of a connection the analyzed neuron sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Partner is presynaptic; the connection is one of the neuron's inputs.
    Input,
    /// Partner is postsynaptic.
    Output,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Input, Direction::Output];
}

/// A `ConnectsTo` edge: `pre` makes `weight` synapses onto `post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Synapse {
    pub pre: BodyId,
    pub post: BodyId,
    pub weight: u64,
}

impl Synapse {
    pub fn new(pre: impl Into<BodyId>, post: impl Into<BodyId>, weight: u64) -> Self {
        Self { pre: pre.into(), post: post.into(), weight }
    }
}

/// One row of the connectivity query for a cell type.
///
/// Field names on the wire follow the neuPrint query columns
/// (`bodyId`, `bodyId2`, `type2`, `isOutput`, ...), so rows exported from
/// neuPrint deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRow {
    #[serde(rename = "bodyId")]
    pub body_id: BodyId,
    #[serde(default)]
    pub instance: Option<String>,
    pub weight: u64,
    #[serde(rename = "bodyId2")]
    pub partner_id: BodyId,
    #[serde(rename = "type2", default)]
    pub partner_type: Option<String>,
    #[serde(rename = "isOutput")]
    pub is_output: bool,
    #[serde(rename = "body1status", default)]
    pub status: Option<String>,
    #[serde(rename = "body2status", default)]
    pub partner_status: Option<String>,
}

impl ConnectionRow {
    pub fn direction(&self) -> Direction {
        if self.is_output { Direction::Output } else { Direction::Input }
    }

    pub fn status(&self) -> NeuronStatus {
        NeuronStatus::parse(self.status.as_deref())
    }

    pub fn partner_status(&self) -> NeuronStatus {
        NeuronStatus::parse(self.partner_status.as_deref())
    }

    /// Partner label and whether it is a semantic type.
    ///
    /// Untyped partners are labelled by their body id.
    pub fn partner_label(&self) -> (String, bool) {
        match self.partner_type.as_deref() {
            Some(t) if !t.is_empty() => (t.to_owned(), true),
            _ => (self.partner_id.to_string(), false),
        }
    }
}
