//! Neuron (body) in the connectivity graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque body identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BodyId {
    fn from(v: u64) -> Self { BodyId(v) }
}

/// Proofreading status of a body.
///
/// Only the three statuses the analysis cares about get their own variant;
/// everything else (including a missing status) is carried as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NeuronStatus {
    Traced,
    RoughlyTraced,
    Leaves,
    Other(String),
}

impl NeuronStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("Traced") => NeuronStatus::Traced,
            Some("Roughly traced") => NeuronStatus::RoughlyTraced,
            Some("Leaves") => NeuronStatus::Leaves,
            Some(other) => NeuronStatus::Other(other.to_owned()),
            None => NeuronStatus::Other(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NeuronStatus::Traced => "Traced",
            NeuronStatus::RoughlyTraced => "Roughly traced",
            NeuronStatus::Leaves => "Leaves",
            NeuronStatus::Other(s) => s,
        }
    }

    /// Traced, Roughly traced or Leaves. Bodies below this are not analyzed.
    pub fn is_primary(&self) -> bool {
        matches!(self, NeuronStatus::Traced | NeuronStatus::RoughlyTraced | NeuronStatus::Leaves)
    }

    /// Traced or Roughly traced. Required for reference membership and for
    /// untyped partners to count as features.
    pub fn is_connection_grade(&self) -> bool {
        matches!(self, NeuronStatus::Traced | NeuronStatus::RoughlyTraced)
    }
}

impl fmt::Display for NeuronStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A neuron node as stored by a connection source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: BodyId,
    /// Semantic cell type, e.g. `"MBON14"`.
    pub cell_type: Option<String>,
    /// Instance name, e.g. `"MBON14(a3)_R"`.
    pub instance: Option<String>,
    pub status: Option<String>,
}

impl Neuron {
    pub fn new(id: impl Into<BodyId>) -> Self {
        Self {
            id: id.into(),
            cell_type: None,
            instance: None,
            status: None,
        }
    }

    pub fn with_type(mut self, cell_type: impl Into<String>) -> Self {
        self.cell_type = Some(cell_type.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn status(&self) -> NeuronStatus {
        NeuronStatus::parse(self.status.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(NeuronStatus::parse(Some("Traced")), NeuronStatus::Traced);
        assert_eq!(NeuronStatus::parse(Some("Roughly traced")), NeuronStatus::RoughlyTraced);
        assert_eq!(NeuronStatus::parse(Some("Leaves")), NeuronStatus::Leaves);
        assert_eq!(NeuronStatus::parse(Some("Orphan")), NeuronStatus::Other("Orphan".into()));
        assert!(!NeuronStatus::parse(None).is_primary());
    }

    #[test]
    fn test_status_grades() {
        assert!(NeuronStatus::Leaves.is_primary());
        assert!(!NeuronStatus::Leaves.is_connection_grade());
        assert!(NeuronStatus::RoughlyTraced.is_connection_grade());
    }
}
