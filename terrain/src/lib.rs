//! Geodesy and tiled elevation lookup.

pub mod constants;
mod error;
pub mod math;
mod tile_source;
mod tiles;

pub use crate::{
    error::TerrainError,
    tile_source::{TileSource, DEFAULT_ZOOM, MAX_ZOOM, TERRARIUM_URL},
    tiles::{fractional_tile, ElevationSource, TileKey, Tiles},
};
pub use demtile::{Codec, DemError, DemTile};
pub use geo;
