//! Response shaping for lookup results.
//!
//! A lookup is answered with a [`ToolResponse`] carrying both the raw
//! records and a table descriptor for the caller's renderer. The column
//! layout and JSON field order are part of the renderer contract and must
//! stay stable.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::catalog::PillRecord;
use crate::tool::{ToolResponse, UiDescriptor, UiKind};

use super::LookupResult;

pub const NOT_FOUND_TEXT: &str = "No matching pill found in the database.";
pub const NOT_FOUND_UI_TEXT: &str = "No matching pill found.";
pub const FAILURE_TEXT: &str = "Failed to find matching pills";
pub const DETAILS_LINK_TEXT: &str = "See Details";

/// Errors raised while shaping a lookup result into a response.
#[derive(Debug, thiserror::Error)]
pub enum ShapingError {
    #[error("Malformed record #{index}: field '{field}' is empty")]
    MalformedRecord { index: usize, field: &'static str },
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Rendering hint for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Image,
    Link,
}

/// One column of the table view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ColumnKind>,
    pub width: &'static str,
}

impl Column {
    const fn plain(key: &'static str, header: &'static str, width: &'static str) -> Self {
        Self {
            key,
            header,
            kind: None,
            width,
        }
    }

    const fn typed(
        key: &'static str,
        header: &'static str,
        kind: ColumnKind,
        width: &'static str,
    ) -> Self {
        Self {
            key,
            header,
            kind: Some(kind),
            width,
        }
    }
}

const DRUG_COLUMN: Column = Column::plain("drug", "Drug(s)", "20%");
const IMAGE_COLUMN: Column = Column::typed("image", "Image", ColumnKind::Image, "40%");
const COLOR_COLUMN: Column = Column::plain("color", "Color", "15%");
const SHAPE_COLUMN: Column = Column::plain("shape", "Shape", "15%");
const IMPRINT_COLUMN: Column = Column::plain("imprint", "Imprint", "15%");
const URL_COLUMN: Column = Column::typed("url", "Link", ColumnKind::Link, "15%");

/// A cell rendered as a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCell {
    pub text: String,
    pub url: String,
}

/// One table row per matched record, keyed by column key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub drug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub color: String,
    pub shape: String,
    pub imprint: String,
    pub url: LinkCell,
}

/// Table descriptor: column definitions plus one row per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    /// Builds the table for `records`.
    ///
    /// The image column is present only when at least one record carries an
    /// image; rows without one then get an empty cell.
    pub fn from_records(records: &[Arc<PillRecord>]) -> Result<Self, ShapingError> {
        if let Some((index, field)) = records
            .iter()
            .enumerate()
            .find_map(|(index, record)| record.first_empty_field().map(|field| (index, field)))
        {
            return Err(ShapingError::MalformedRecord { index, field });
        }

        let with_images = records.iter().any(|record| record.image_url.is_some());

        let mut columns = vec![DRUG_COLUMN];
        if with_images {
            columns.push(IMAGE_COLUMN);
        }
        columns.extend([COLOR_COLUMN, SHAPE_COLUMN, IMPRINT_COLUMN, URL_COLUMN]);

        let rows = records
            .iter()
            .map(|record| TableRow {
                drug: record.name.clone(),
                image: with_images.then(|| record.image_url.clone().unwrap_or_default()),
                color: record.color.clone(),
                shape: record.shape.clone(),
                imprint: record.imprint.clone(),
                url: LinkCell {
                    text: DETAILS_LINK_TEXT.to_string(),
                    url: record.url.clone(),
                },
            })
            .collect();

        Ok(Self { columns, rows })
    }
}

/// Shapes a lookup result into the response delivered to the caller.
pub fn shape_response(result: &LookupResult) -> Result<ToolResponse, ShapingError> {
    let Some(table) = result.table()? else {
        return Ok(not_found_response());
    };

    Ok(ToolResponse {
        text: format!(
            "Found {} matching pill(s) based on the provided criteria.",
            result.len()
        ),
        data: result.data()?,
        ui: UiDescriptor {
            kind: UiKind::Table,
            ui_data: serde_json::to_string(&table)?,
        },
    })
}

/// Response for a lookup that matched nothing.
pub fn not_found_response() -> ToolResponse {
    ToolResponse::text(NOT_FOUND_TEXT, NOT_FOUND_UI_TEXT)
}

const FAILURE_ALERT_JSON: &str =
    r#"{"type":"error","title":"Error","message":"Failed to find matching pills."}"#;

/// Response for a lookup whose result could not be shaped.
pub fn failure_response() -> ToolResponse {
    ToolResponse {
        text: FAILURE_TEXT.to_string(),
        data: json!({ "error": FAILURE_TEXT }),
        ui: UiDescriptor {
            kind: UiKind::Alert,
            ui_data: FAILURE_ALERT_JSON.to_string(),
        },
    }
}
