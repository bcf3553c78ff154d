use serde::Serialize;
use thiserror::Error;

use crate::format::FormatError;

/// Every way a report generation can fail.
///
/// Each pipeline stage converts its own failures into one of these variants;
/// nothing else crosses the [`crate::pipeline::ReportPipeline`] boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Invalid report configuration: {0}")]
    ConfigValidation(String),

    #[error("Error fetching data from stored procedure '{procedure}': {message}")]
    DataAccess { procedure: String, message: String },

    #[error("No data returned from the stored procedure '{procedure}'")]
    EmptyResult { procedure: String },

    #[error("Error processing fixed data at row {row}, column '{column}': {source}")]
    Mapping {
        row: usize,
        column: String,
        #[source]
        source: FormatError,
    },

    #[error("Error applying filter on column '{column}' at row {row}: {message}")]
    FilterType {
        row: usize,
        column: String,
        message: String,
    },

    #[error("Error writing spreadsheet: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ConfigValidation,
    DataAccess,
    EmptyResult,
    Mapping,
    FilterType,
    Serialization,
}

/// Transport-neutral failure body: a kind plus a human readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailurePayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::ConfigValidation(_) => ErrorKind::ConfigValidation,
            ReportError::DataAccess { .. } => ErrorKind::DataAccess,
            ReportError::EmptyResult { .. } => ErrorKind::EmptyResult,
            ReportError::Mapping { .. } => ErrorKind::Mapping,
            ReportError::FilterType { .. } => ErrorKind::FilterType,
            ReportError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub fn payload(&self) -> FailurePayload {
        FailurePayload {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl FailurePayload {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}
