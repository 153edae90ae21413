//! Error types for the `lccb` binary.

use lccb_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Encoding or decoding failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// I/O error reading an input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input or output error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config or task file error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `--at` is not an RFC 3339 timestamp.
    #[error("invalid timestamp {input:?}: {source}")]
    Timestamp {
        input: String,
        source: chrono::ParseError,
    },
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
