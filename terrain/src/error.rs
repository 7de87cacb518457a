use demtile::DemError;
use netcache::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Dem(#[from] DemError),
}
