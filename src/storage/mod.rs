//! # Connection Sources
//!
//! The contract between the analysis and whatever holds the connectome.
//! A source answers one question: given a dataset and a cell type, return
//! every weighted connection incident to a neuron of that type, together
//! with both endpoints' status and the neuron's instance name.
//!
//! ## Implementations
//!
//! | Source | Module | Description |
//! |--------|--------|-------------|
//! | `MemorySource` | `memory` | In-memory graph for testing/embedding |
//! | `RowsFileSource` | `rows` | Rows exported from neuPrint as JSON |

pub mod memory;
pub mod rows;

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::model::ConnectionRow;
use crate::Result;

pub use memory::MemorySource;
pub use rows::RowsFileSource;

/// The connectivity query contract.
///
/// Equivalent to the neuPrint query
///
/// ```text
/// MATCH (n :`{dataset}_Neuron` {type: $cell_type})-[x :ConnectsTo]-(m)
/// RETURN n.bodyId, n.instance, x.weight, m.bodyId, m.type,
///        startNode(x) = n, n.status, m.status
/// ```
#[async_trait]
pub trait ConnectionSource: Send + Sync + 'static {
    /// All connections incident to neurons of `cell_type` in `dataset`.
    /// An unknown dataset or type yields no rows, not an error.
    async fn fetch_connections(&self, dataset: &str, cell_type: &str) -> Result<Vec<ConnectionRow>>;

    /// Datasets this source can answer for. Default: unknown (empty).
    async fn datasets(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl<S: ConnectionSource + ?Sized> ConnectionSource for Box<S> {
    async fn fetch_connections(&self, dataset: &str, cell_type: &str) -> Result<Vec<ConnectionRow>> {
        (**self).fetch_connections(dataset, cell_type).await
    }

    async fn datasets(&self) -> Result<Vec<String>> {
        (**self).datasets().await
    }
}

/// Open the source described by `config`.
pub fn open(config: &SourceConfig) -> Box<dyn ConnectionSource> {
    match config {
        SourceConfig::RowsFile { path } => Box::new(RowsFileSource::new(path.clone())),
    }
}
