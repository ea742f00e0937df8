//! Error types for taskstash
//!
//! Exit codes:
//! - 2: User error (bad args, unknown task, category rule violation)
//! - 4: Operation failed (I/O, lock contention, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskstash CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Rejections from the category store.
///
/// These never escape as panics; callers decide how to phrase them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Category already exists: {0}")]
    DuplicateName(String),

    #[error("Category name is reserved: {0}")]
    ReservedName(String),

    #[error("Category not found: {0}")]
    NotFound(String),
}

/// Main error type for taskstash operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task id '{input}' is ambiguous ({matches} matches)")]
    AmbiguousTaskId { input: String, matches: usize },

    #[error(transparent)]
    Category(#[from] CategoryError),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::AmbiguousTaskId { .. }
            | Error::Category(_)
            | Error::NoDataDir => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the variant carries any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::AmbiguousTaskId { input, matches } => Some(serde_json::json!({
                "input": input,
                "matches": matches,
            })),
            Error::Category(err) => Some(serde_json::json!({
                "category_error": category_error_kind(err),
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "lock_path": path.display().to_string(),
            })),
            _ => None,
        }
    }
}

fn category_error_kind(err: &CategoryError) -> &'static str {
    match err {
        CategoryError::EmptyName => "empty_name",
        CategoryError::DuplicateName(_) => "duplicate_name",
        CategoryError::ReservedName(_) => "reserved_name",
        CategoryError::NotFound(_) => "not_found",
    }
}

/// Result type alias for taskstash operations
pub type Result<T> = std::result::Result<T, Error>;
