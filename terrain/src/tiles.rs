//! Tiled elevation lookup.

use crate::{TerrainError, TileSource};
use async_trait::async_trait;
use dashmap::DashMap;
use demtile::DemTile;
use geo::geometry::Coord;
use log::debug;
use netcache::SharedFetch;
use std::{f64::consts::PI, sync::Arc};

/// Slippy map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

/// Anything that can answer "how high is the ground here", in meters.
#[async_trait]
pub trait ElevationSource: Send + Sync {
    async fn elevation(&self, coord: Coord) -> Result<f64, TerrainError>;
}

#[derive(Clone)]
pub struct Tiles {
    source: TileSource,

    /// Shared with anything else fetching from the same network.
    fetch: SharedFetch,

    /// Tiles which have been decoded on demand. Never evicted.
    tiles: Arc<DashMap<TileKey, Arc<DemTile>>>,
}

impl Tiles {
    pub fn new(source: TileSource, fetch: SharedFetch) -> Self {
        Self {
            source,
            fetch,
            tiles: Arc::new(DashMap::new()),
        }
    }

    pub fn source(&self) -> &TileSource {
        &self.source
    }

    /// Returns the elevation at `coord` in meters.
    pub async fn get(&self, coord: Coord) -> Result<f64, TerrainError> {
        let (fx, fy) = fractional_tile(coord, self.source.zoom_level());
        let key = tile_key(fx, fy, self.source.zoom_level());
        let tile = self.tile(key).await?;
        Ok(tile.sample(fx - fx.floor(), fy - fy.floor()))
    }

    /// Returns the tile for `key`, fetching and decoding it if needed.
    ///
    /// Tiles that fail to decode are not cached.
    pub async fn tile(&self, key: TileKey) -> Result<Arc<DemTile>, TerrainError> {
        if let Some(tile) = self.tiles.get(&key) {
            return Ok(Arc::clone(tile.value()));
        }
        let url = self.source.url(key);
        let raw = self.fetch.get(&url).await?;
        let decoded = DemTile::decode(self.source.codec(), &raw).and_then(|tile| {
            match self.source.width() {
                Some(width) => tile.expect_width(width),
                None => Ok(tile),
            }
        });
        let tile = match decoded {
            Ok(tile) => tile,
            Err(e) => {
                self.fetch.evict(&url);
                return Err(e.into());
            }
        };
        debug!("decoded {key:?}, {} samples", tile.len());
        let tile = Arc::clone(self.tiles.entry(key).or_insert_with(|| Arc::new(tile)).value());
        self.fetch.evict(&url);
        Ok(tile)
    }

    /// Returns the number of decoded tiles held.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[async_trait]
impl ElevationSource for Tiles {
    async fn elevation(&self, coord: Coord) -> Result<f64, TerrainError> {
        self.get(coord).await
    }
}

/// Projects `coord` to spherical Mercator tile space at `zoom`.
pub fn fractional_tile(Coord { x: lon, y: lat }: Coord, zoom: u8) -> (f64, f64) {
    let sin = lat.to_radians().sin();
    let z2 = f64::from(1_u32 << zoom);
    let fx = z2 * (lon / 360.0 + 0.5);
    let fy = z2 * (0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI);
    (fx, fy)
}

fn tile_key(fx: f64, fy: f64, z: u8) -> TileKey {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    TileKey {
        x: fx.floor() as u32,
        y: fy.floor() as u32,
        z,
    }
}
