use std::path::PathBuf;
use thiserror::Error;

/// A failed network request.
///
/// Cloneable so a single failure can be handed to every caller
/// sharing the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid cache file {0}")]
    File(PathBuf),

    #[error("corrupt cache entry {key}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
}
