use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::PillRecord;

/// A shared, read-only view of every record in a catalog, in catalog order.
pub type Snapshot = Arc<[Arc<PillRecord>]>;

/// Errors raised while loading the pill dataset.
///
/// Any of these is fatal at startup: the service must not serve requests
/// from a partially loaded catalog.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("Failed to read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid catalog record #{index}: field '{field}' is empty")]
    InvalidRecord { index: usize, field: &'static str },
}

/// Source of pill records for the lookup service.
///
/// Every call returns the records as they are right now. A store loaded once
/// always hands back the same snapshot; a reloading source may not.
#[cfg_attr(test, mockall::automock)]
pub trait Catalog: Send + Sync {
    /// Returns the current records in catalog order.
    fn snapshot(&self) -> Snapshot;
}

/// The in-memory pill catalog, loaded once and never mutated.
#[derive(Clone)]
pub struct CatalogStore {
    records: Snapshot,
}

impl CatalogStore {
    /// Loads the catalog from a JSON array of records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        debug!("Loading pill catalog from {}", path.display());

        let raw = std::fs::read_to_string(path).map_err(|source| DataLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let records: Vec<PillRecord> =
            serde_json::from_str(&raw).map_err(|source| DataLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_records(records)?;
        if store.is_empty() {
            warn!("Pill catalog {} contains no records", path.display());
        }
        info!(records = store.len(), "Loaded pill catalog from {}", path.display());

        Ok(store)
    }

    /// Builds a catalog from records already in memory.
    pub fn from_records(records: Vec<PillRecord>) -> Result<Self, DataLoadError> {
        if let Some((index, field)) = records
            .iter()
            .enumerate()
            .find_map(|(index, record)| record.first_empty_field().map(|field| (index, field)))
        {
            return Err(DataLoadError::InvalidRecord { index, field });
        }

        Ok(Self {
            records: records.into_iter().map(Arc::new).collect(),
        })
    }

    /// Returns all records in catalog order.
    pub fn records(&self) -> &[Arc<PillRecord>] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Catalog for CatalogStore {
    fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.records)
    }
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("records_count", &self.records.len())
            .finish()
    }
}
