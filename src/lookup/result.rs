use std::sync::Arc;

use serde_json::Value;

use crate::catalog::PillRecord;

use super::view::{ShapingError, TableView};

/// Outcome of a single lookup.
///
/// `Found` always holds at least one record, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(Vec<Arc<PillRecord>>),
    NotFound,
}

impl LookupResult {
    /// Builds a result from the matched records.
    pub fn from_matches(matches: Vec<Arc<PillRecord>>) -> Self {
        if matches.is_empty() {
            Self::NotFound
        } else {
            Self::Found(matches)
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The matched records; empty when nothing matched.
    pub fn records(&self) -> &[Arc<PillRecord>] {
        match self {
            Self::Found(records) => records,
            Self::NotFound => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Plain-data projection: the matched records, or `null`.
    pub fn data(&self) -> Result<Value, ShapingError> {
        match self {
            Self::Found(records) => Ok(serde_json::to_value(records)?),
            Self::NotFound => Ok(Value::Null),
        }
    }

    /// Presentation projection: the table to render, or `None` when nothing
    /// matched.
    pub fn table(&self) -> Result<Option<TableView>, ShapingError> {
        match self {
            Self::Found(records) => TableView::from_records(records).map(Some),
            Self::NotFound => Ok(None),
        }
    }
}
