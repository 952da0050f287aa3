//! CLI error types.

use wr_config::ConfigError;
use wr_renderer::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid event stream: {0}")]
    Events(#[from] serde_json::Error),

    #[error("{0}")]
    Render(#[from] RenderError),
}
