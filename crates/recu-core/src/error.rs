//! Error types for the recu-core library.
//!
//! Field extraction itself never fails: a value that cannot be determined is
//! reported as `None`. These errors cover the fallible edges around it.

use thiserror::Error;

/// Main error type for the recu library.
#[derive(Error, Debug)]
pub enum RecuError {
    /// Configuration could not be read, written or applied.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to extraction configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file is not valid JSON for [`RecuConfig`](crate::RecuConfig).
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A keyword list could not be compiled into a matcher.
    #[error("invalid keyword list for {field}: {reason}")]
    Keywords { field: String, reason: String },

    /// A numeric setting is out of its meaningful range.
    #[error("invalid value for {field}: {reason}")]
    Value { field: String, reason: String },
}

/// Result type for the recu library.
pub type Result<T> = std::result::Result<T, RecuError>;
