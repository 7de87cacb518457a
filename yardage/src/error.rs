use terrain::TerrainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("{0}")]
    Terrain(#[from] TerrainError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no position fix available")]
pub struct PositionUnavailable;
