//! Error types shared across the workspace.
//!
//! `CoreError` covers configuration and boundary validation.  `SourceError`
//! is what external collaborators (snapshot feed, routing service) report;
//! the engine recovers from every `SourceError` locally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `lm-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure reported by an external data or routing collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// Transport failed or the service answered with a non-success status.
    #[error("network failure: {0}")]
    Network(String),

    /// The response could not be parsed or lacked required fields.
    #[error("malformed response: {0}")]
    Malformed(String),
}
