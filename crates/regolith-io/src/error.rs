//! Error types for configuration and checkpoint files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the JSON run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for `SimParams`.
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Fatal checkpoint errors. Per-line problems are reported as [`LineError`] instead.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("cannot open checkpoint {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read failed at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// A checkpoint data line that was skipped. Line numbers are 1-based and count the header.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("line {line}: expected at least 3 fields, found {found}")]
    TooFewFields { line: usize, found: usize },

    #[error("line {line}: field {column} is not a number: {token:?}")]
    BadNumber { line: usize, column: usize, token: String },
}

impl LineError {
    pub fn line(&self) -> usize {
        match *self {
            LineError::TooFewFields { line, .. } | LineError::BadNumber { line, .. } => line,
        }
    }
}
