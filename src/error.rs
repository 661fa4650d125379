//! Error types for claimcheck
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Classification itself is infallible. These errors surface from the
//! collaborators around it (log readers, baseline comparators, claim stores,
//! config loading); the engine turns them into logged defaults.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// claimcheck error types
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied an unusable value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Claim store rejected a write or read
    #[error("Claim store error ({category}): {message}")]
    Store {
        /// Category store that failed
        category: String,
        /// Underlying failure
        message: String,
    },

    /// A claim with the same key already exists (stores are append-only)
    #[error("Claim already exists: {0}\nClaim stores are append-only; promote with a fresh key")]
    DuplicateClaim(String),

    /// Baseline comparison could not be computed
    #[error("Baseline comparison unavailable: {0}")]
    Baseline(String),

    /// External collaborator (log reader, source control) failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
