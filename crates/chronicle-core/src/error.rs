//! Error types for dataset loading.
//!
//! Loading is the only place the data model can fail. Everything after a
//! successful load answers "not found" with neutral values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or validating a timeline dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid date '{0}': expected YYYY, YYYY-MM, YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("score {0} is outside the range 0..=10")]
    InvalidScore(i64),

    #[error("invalid dimension name '{0}'")]
    InvalidDimension(String),

    #[error("node '{0}' is declared more than once")]
    DuplicateNode(String),

    #[error("branch '{0}' is declared more than once")]
    DuplicateBranch(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
