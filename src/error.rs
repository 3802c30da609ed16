use std::path::PathBuf;

use thiserror::Error;

/// Fatal ingestion failures. Retrying with the same bytes cannot succeed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input is empty")]
    Empty,
    #[error("header row defines no columns")]
    NoColumns,
    #[error("no data rows found after the header ({skipped} malformed row(s) skipped)")]
    NoRows { skipped: usize },
    #[error("unable to read header row: {0}")]
    Header(#[source] csv::Error),
    #[error("header row is not valid {encoding}")]
    Encoding { encoding: &'static str },
    #[error("unknown input encoding '{0}'")]
    UnknownEncoding(String),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("unknown dashboard style '{0}' (expected simple, ml, or powerbi)")]
    UnknownStyle(String),
    #[error("input of {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },
    #[error("corrupt dashboard document {path:?}: {reason}")]
    CorruptDocument { path: PathBuf, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
