//! # celltype-rs: Canonical Cell-Type Analysis
//!
//! Computes the "canonical" neuron of a cell type from connectome data and
//! reports how every neuron of the type compares with its group.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `ConnectionSource` is the contract between the
//!    analysis and whatever holds the connectome
//! 2. **Pure pipeline**: rows → report is a pure function (`analysis::run`)
//! 3. **Stage outputs are values**: each stage returns a new structure
//!    instead of flagging the previous one in place
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use celltype_rs::{Analyzer, Neuron, Synapse};
//!
//! # async fn example() -> celltype_rs::Result<()> {
//! let analyzer = Analyzer::open_memory();
//! let db = analyzer.source();
//! db.add_neuron("hemibrain", Neuron::new(1).with_type("MBON14").with_status("Traced"));
//! db.add_neuron("hemibrain", Neuron::new(2).with_type("KC").with_status("Traced"));
//! db.add_synapse("hemibrain", Synapse::new(2, 1, 25))?;
//!
//! let report = analyzer.analyze("hemibrain", "MBON14").await?;
//! println!("canonical neuron: {:?}", report.centroid);
//! # Ok(())
//! # }
//! ```
//!
//! ## Connection Sources
//!
//! | Source | Description |
//! |--------|-------------|
//! | Memory | In-memory connectome for testing/embedding |
//! | Rows file | JSON rows exported from neuPrint |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod analysis;
pub mod storage;
pub mod export;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{BodyId, ConnectionRow, Direction, Neuron, NeuronStatus, Synapse};
pub use config::{AnalysisConfig, SourceConfig};
pub use analysis::{CellTypeReport, DirectionReport, NeuronInfo};
pub use storage::{ConnectionSource, MemorySource, RowsFileSource};

// ============================================================================
// Top-level Analyzer handle
// ============================================================================

/// The primary entry point. An `Analyzer` wraps a connection source and
/// runs the cell-type pipeline over what it returns.
pub struct Analyzer<S: ConnectionSource> {
    source: S,
    config: AnalysisConfig,
}

impl<S: ConnectionSource> Analyzer<S> {
    /// Create an analyzer with default thresholds.
    pub fn with_source(source: S) -> Self {
        Self { source, config: AnalysisConfig::default() }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Access the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the connections of `cell_type` and analyze them.
    #[tracing::instrument(skip(self))]
    pub async fn analyze(&self, dataset: &str, cell_type: &str) -> Result<CellTypeReport> {
        let rows = self.source.fetch_connections(dataset, cell_type).await?;
        analysis::run(&rows, &self.config)
    }

    /// Like [`analyze`](Self::analyze), rendered as the JSON report.
    pub async fn analyze_json(&self, dataset: &str, cell_type: &str) -> Result<serde_json::Value> {
        let report = self.analyze(dataset, cell_type).await?;
        Ok(export::report_to_json(&report))
    }
}

/// In-memory connectome for testing and embedding.
impl Analyzer<MemorySource> {
    pub fn open_memory() -> Self {
        Self::with_source(MemorySource::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid connection row: {0}")]
    InvalidRow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
