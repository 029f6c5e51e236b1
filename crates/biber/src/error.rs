//! CLI error types.

use std::path::PathBuf;

use biber_config::ConfigError;
use biber_post::PostError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Post { path: PathBuf, source: PostError },

    #[error("{}: '{file}' is outside the post directory", path.display())]
    OutsidePost { path: PathBuf, file: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0} post(s) failed to build")]
    BuildFailed(usize),
}

impl CliError {
    /// Attach a path to an I/O error.
    pub(crate) fn file(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::File { path, source }
    }
}
