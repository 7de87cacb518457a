use netcache::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{0}")]
    Transport(#[from] FetchError),

    #[error("unparseable response: {0}")]
    Json(#[from] serde_json::Error),

    /// The server gave up partway, e.g. on a timeout.
    #[error("overpass: {0}")]
    Remark(String),
}
