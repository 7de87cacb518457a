//! Elevation tile encodings.
//!
//! # References
//!
//! 1. [Terrarium](https://github.com/tilezen/joerd/blob/master/docs/formats.md#terrarium)
//! 1. [Mapbox Terrain-RGB](https://docs.mapbox.com/data/tilesets/reference/mapbox-terrain-rgb-v1/)
//! 1. [Archive Team HGT](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)

use crate::{DemError, DemTile};
use byteorder::{BigEndian as BE, LittleEndian as LE, ReadBytesExt};
use image::{ImageFormat, Rgb};
use std::mem::size_of;

/// How a tile's bytes map to elevation samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// RGB PNG, `r * 256 + g + b / 256 - 32768` meters.
    Terrarium,

    /// RGB PNG, `-10000 + (r * 65536 + g * 256 + b) * 0.1` meters.
    TerrainRgb,

    /// Square grid of big-endian `i16` meters, row-major from the
    /// north-west corner.
    ///
    /// Like SRTM `.hgt` files, the last row and column duplicate the
    /// first row and column of the neighboring tiles.
    Hgt,

    /// Square grid of little-endian `f32` meters, row-major from the
    /// north-west corner.
    F32,
}

impl Codec {
    pub fn decode(self, bytes: &[u8]) -> Result<DemTile, DemError> {
        let tile = match self {
            Self::Terrarium => decode_png(bytes, terrarium),
            Self::TerrainRgb => decode_png(bytes, terrain_rgb),
            Self::Hgt => decode_hgt(bytes),
            Self::F32 => decode_f32(bytes),
        }?;
        Ok(if self.shares_edges() {
            tile
        } else {
            tile.without_shared_edges()
        })
    }

    /// Returns true if tiles in this encoding repeat their neighbors'
    /// first row and column as their last.
    pub fn shares_edges(self) -> bool {
        matches!(self, Self::Hgt | Self::F32)
    }
}

fn terrarium(Rgb([r, g, b]): Rgb<u8>) -> f32 {
    f32::from(r) * 256.0 + f32::from(g) + f32::from(b) / 256.0 - 32768.0
}

#[allow(clippy::cast_possible_truncation)]
fn terrain_rgb(Rgb([r, g, b]): Rgb<u8>) -> f32 {
    let packed = u32::from(r) * 65536 + u32::from(g) * 256 + u32::from(b);
    (-10_000.0 + f64::from(packed) * 0.1) as f32
}

fn decode_png(bytes: &[u8], f: fn(Rgb<u8>) -> f32) -> Result<DemTile, DemError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.into_rgb8();
    let (cols, rows) = img.dimensions();
    if cols != rows {
        return Err(DemError::MalformedTile(format!(
            "{cols}x{rows} raster is not square"
        )));
    }
    let samples = img.pixels().map(|px| f(*px)).collect();
    DemTile::new(cols as usize, samples)
}

fn decode_hgt(bytes: &[u8]) -> Result<DemTile, DemError> {
    let width = square_width(bytes.len(), size_of::<i16>())?;
    let mut rdr = bytes;
    let mut samples = Vec::with_capacity(width * width);
    for _ in 0..(width * width) {
        samples.push(f32::from(rdr.read_i16::<BE>()?));
    }
    DemTile::new(width, samples)
}

fn decode_f32(bytes: &[u8]) -> Result<DemTile, DemError> {
    let width = square_width(bytes.len(), size_of::<f32>())?;
    let mut rdr = bytes;
    let mut samples = Vec::with_capacity(width * width);
    for _ in 0..(width * width) {
        samples.push(rdr.read_f32::<LE>()?);
    }
    DemTile::new(width, samples)
}

/// Infers the width of a square grid from its length in bytes.
fn square_width(len: usize, sample_size: usize) -> Result<usize, DemError> {
    let mk_err = || DemError::MalformedTile(format!("{len} bytes is not a square grid"));
    if len % sample_size != 0 {
        return Err(mk_err());
    }
    let count = len / sample_size;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let width = (count as f64).sqrt().round() as usize;
    if width < 2 || width * width != count {
        return Err(mk_err());
    }
    Ok(width)
}
