//! Error types for the fitlog_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A user with this username already exists
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// No user record matches the given id
    #[error("Unknown user id: {0}")]
    UserNotFound(String),

    /// Username is blank
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    /// Duration could not be parsed as a number
    #[error("Invalid duration: {0:?} is not a number")]
    InvalidDuration(String),

    /// Supplied date could not be parsed
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// Store refused a record whose username is already present
    #[error("Unique key violation on username {0:?}")]
    UniqueViolation(String),

    /// Could not acquire the store lock in time
    #[error("Timed out after {timeout_ms}ms waiting for lock on {path:?}")]
    StoreTimeout { path: PathBuf, timeout_ms: u64 },

    /// Store document exists but cannot be parsed
    #[error("Store document {path:?} is corrupted: {details}")]
    CorruptStore { path: PathBuf, details: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`] for callers deciding presentation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateUsername,
    UserNotFound,
    InvalidInput,
    Store,
    Config,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateUsername(_) | Error::UniqueViolation(_) => {
                ErrorKind::DuplicateUsername
            }
            Error::UserNotFound(_) => ErrorKind::UserNotFound,
            Error::InvalidUsername(_) | Error::InvalidDuration(_) | Error::InvalidDate(_) => {
                ErrorKind::InvalidInput
            }
            Error::Config(_) | Error::Toml(_) => ErrorKind::Config,
            Error::StoreTimeout { .. }
            | Error::CorruptStore { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::Csv(_) => ErrorKind::Store,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::DuplicateUsername => 2,
            ErrorKind::UserNotFound => 3,
            ErrorKind::InvalidInput => 4,
            ErrorKind::Store | ErrorKind::Config => 1,
        }
    }

    /// Whether the caller can fix this by changing its input
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DuplicateUsername | ErrorKind::UserNotFound | ErrorKind::InvalidInput
        )
    }
}
