//! Decoded elevation raster tiles.
//!
//! A [`DemTile`] is a square, row-major grid of elevation samples
//! whose first sample sits on the tile's north-west corner. Some tiles
//! carry one sample more than their nominal size (e.g. 257
//! for a 256 tile) so neighbors share their edge samples.

mod codec;
mod error;

pub use crate::{codec::Codec, error::DemError};

pub struct DemTile {
    /// Number of samples per row (and rows per tile).
    width: usize,

    /// Elevation samples in meters.
    samples: Box<[f32]>,

    /// The last row and column duplicate the neighboring tiles' first.
    shares_edges: bool,
}

impl DemTile {
    /// Returns a tile built from `width * width` row-major samples.
    pub fn new(width: usize, samples: Vec<f32>) -> Result<Self, DemError> {
        if width < 2 || samples.len() != width * width {
            return Err(DemError::MalformedTile(format!(
                "{} samples for width {width}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            samples: samples.into_boxed_slice(),
            shares_edges: true,
        })
    }

    /// Marks this tile as covering only its own area, with no edge
    /// samples shared with its neighbors.
    pub fn without_shared_edges(mut self) -> Self {
        self.shares_edges = false;
        self
    }

    pub fn shares_edges(&self) -> bool {
        self.shares_edges
    }

    /// Decodes `bytes` with `codec`.
    pub fn decode(codec: Codec, bytes: &[u8]) -> Result<Self, DemError> {
        codec.decode(bytes)
    }

    /// Fails with `MalformedTile` unless this tile is `width` samples
    /// wide.
    pub fn expect_width(self, width: usize) -> Result<Self, DemError> {
        if self.width == width {
            Ok(self)
        } else {
            Err(DemError::MalformedTile(format!(
                "expected width {width}, got {}",
                self.width
            )))
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns the sample at column `x`, row `y`.
    pub fn get_xy(&self, (x, y): (usize, usize)) -> Option<f32> {
        if x < self.width && y < self.width {
            Some(self.samples[y * self.width + x])
        } else {
            None
        }
    }

    /// Returns the sample nearest a fractional position within the
    /// tile, where `(0, 0)` is the north-west corner and `(1, 1)` the
    /// south-east corner.
    pub fn sample(&self, frac_x: f64, frac_y: f64) -> f64 {
        let (x, y) = self.pixel(frac_x, frac_y);
        f64::from(self.samples[y * self.width + x])
    }

    /// Returns the (column, row) addressed by a fractional position.
    ///
    /// Tiles sharing edges with their neighbors round over a span of
    /// `width - 1`, since their last row and column belong to the next
    /// tiles. Other tiles truncate over the full width.
    pub fn pixel(&self, frac_x: f64, frac_y: f64) -> (usize, usize) {
        let last = self.width - 1;
        #[allow(clippy::cast_precision_loss)]
        let (span, width) = (last as f64, self.width as f64);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = |frac: f64| {
            let frac = frac.clamp(0.0, 1.0);
            let idx = if self.shares_edges {
                (frac * span).round()
            } else {
                (frac * width).floor()
            };
            (idx as usize).min(last)
        };
        (index(frac_x), index(frac_y))
    }
}
