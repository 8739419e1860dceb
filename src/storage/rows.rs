//! Connection rows exported from neuPrint.
//!
//! The file is a JSON array of query rows, i.e. the result of the
//! connectivity query for a single cell type saved with
//! `df.to_json(orient="records")`. The dataset and cell type passed to
//! [`ConnectionSource::fetch_connections`] are recorded in the log only;
//! the file already holds the answer.
//!
//! The file is read with blocking `std::fs` calls inside the async fetch.
//! That suits the current-thread runtime of the CLI; callers on a
//! multi-threaded runtime should wrap the fetch in `spawn_blocking`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::model::ConnectionRow;
use crate::{Error, Result};
use super::ConnectionSource;

/// Reads connection rows from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct RowsFileSource {
    path: PathBuf,
}

impl RowsFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a JSON array of connection rows.
pub fn parse_rows(text: &str) -> Result<Vec<ConnectionRow>> {
    serde_json::from_str(text).map_err(|e| Error::InvalidRow(e.to_string()))
}

#[async_trait]
impl ConnectionSource for RowsFileSource {
    async fn fetch_connections(&self, dataset: &str, cell_type: &str) -> Result<Vec<ConnectionRow>> {
        let text = std::fs::read_to_string(&self.path)?;
        let rows = parse_rows(&text)?;
        tracing::debug!(
            path = %self.path.display(),
            dataset,
            cell_type,
            rows = rows.len(),
            "loaded connection rows"
        );
        Ok(rows)
    }
}
