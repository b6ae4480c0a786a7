//! CLI error types.

use quill_config::ConfigError;
use quill_diagrams::DecodeError;
use quill_post::ScaffoldError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Scaffold(#[from] ScaffoldError),

    #[error("Invalid token: {0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Validation(String),
}
