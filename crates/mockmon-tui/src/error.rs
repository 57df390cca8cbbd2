//! Error types shared by the console layers

use crate::api::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown when a JSON-mode body does not parse
pub const INVALID_JSON_BODY: &str = "Body must be valid JSON when the JSON option is enabled.";

/// Problems found in the mock editor before anything is sent to the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", INVALID_JSON_BODY)]
    InvalidJsonBody,
    #[error("Status code must be a number, got {0:?}")]
    StatusNotNumeric(String),
    #[error("Status code {0} is outside 100-599")]
    StatusOutOfRange(u16),
    #[error("Delay must be a non-negative number of milliseconds, got {0:?}")]
    InvalidDelay(String),
    #[error("Path must not be empty")]
    EmptyPath,
}

/// Errors surfaced to the user by console actions
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode logs: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ConsoleError {
    /// Whether the failure was caught locally, before contacting the backend
    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::Validation(_))
    }
}
