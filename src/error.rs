//! Error types for trk
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown id)
//! - 3: Blocked by schedule conflict
//! - 4: Operation failed (io, serialization)

use thiserror::Error;

use crate::task::{EntityId, ItemKind};

/// Exit codes for the trk CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const CONFLICT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for trk operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{kind} not found: {id}")]
    NotFound { kind: ItemKind, id: EntityId },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Schedule conflicts (exit code 3)
    #[error("time window overlaps scheduled item {id} '{name}'")]
    ScheduleConflict { id: EntityId, name: String },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::NotFound { .. }
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Schedule conflicts
            Error::ScheduleConflict { .. } => exit_codes::CONFLICT,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured diagnostics for JSON error envelopes
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { kind, id } => Some(serde_json::json!({
                "kind": kind.to_string(),
                "id": id,
            })),
            Error::ScheduleConflict { id, name } => Some(serde_json::json!({
                "conflicts_with": id,
                "name": name,
            })),
            _ => None,
        }
    }
}

/// Result type alias for trk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
