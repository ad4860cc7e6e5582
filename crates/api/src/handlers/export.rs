//! Export encodings. JSON is the default; `format=csv` produces a CSV
//! attachment with a header row.

use axum::{
    Json,
    http::header,
    response::{IntoResponse, Response},
};
use eyre::eyre;
use mfc_core::errors::MfcError;
use serde::{Deserialize, Serialize};

use crate::middleware::error_handling::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

impl ExportQuery {
    /// Unknown formats fall back to JSON.
    pub fn format(&self) -> ExportFormat {
        match self.format.as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

pub fn to_csv<R: Serialize>(rows: &[R]) -> Result<Vec<u8>, MfcError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| MfcError::Database(eyre!("csv encoding failed: {err}")))?;
    }
    writer
        .into_inner()
        .map_err(|err| MfcError::Database(eyre!("csv encoding failed: {err}")))
}

/// Encodes `rows` in the requested format; `name` is the download file stem.
pub fn export_response<R: Serialize>(
    rows: Vec<R>,
    format: ExportFormat,
    name: &str,
) -> Result<Response, AppError> {
    match format {
        ExportFormat::Json => Ok(Json(rows).into_response()),
        ExportFormat::Csv => {
            let body = to_csv(&rows)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{name}.csv\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
    }
}
