use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the program from starting or shutting down cleanly.
///
/// Playback faults never end up here; the controller absorbs them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ::config::ConfigError,
    },

    #[error("invalid config {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("failed to render settings: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to set up logging: {0}")]
    Logging(String),
}
