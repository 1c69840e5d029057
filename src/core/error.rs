//! Error type for fallible I/O around the game core.
//!
//! In-game operations never fail with an error: invalid actions return
//! `false` or do nothing. [`GameError`] only covers loading and saving
//! configuration and save files.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("could not determine home directory")]
    NoHomeDir,
}

impl GameError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GameError::Io {
            path: path.into(),
            source,
        }
    }
}
