//! Error types for the gesture pipeline.
//!
//! Only detector-contract violations and configuration problems are
//! errors.  A missing hand or a degenerate frame is a normal state and
//! never reaches this type.

use thiserror::Error;

/// Errors surfaced to the host application.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The detector delivered a hand with the wrong number of points.
    #[error("Malformed landmark frame: expected {expected} values, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    /// A tunable is outside its legal range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or parsed.
    #[error("Config load failed: {0}")]
    ConfigLoad(String),

    /// The landmark source reported a failure of its own.
    #[error("Landmark source failed: {0}")]
    Source(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
