//! Common error types for songquiz

use thiserror::Error;

/// Common result type for songquiz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across songquiz crates
///
/// The matching core (normalization, similarity, genre lookup) never returns
/// these; "no match" and "unmapped tag" are ordinary values there.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset or fixture (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied parameter (e.g. a similarity threshold)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
