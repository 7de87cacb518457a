//! Where elevation tiles come from and how to read them.

use crate::TileKey;
use demtile::Codec;

pub const DEFAULT_ZOOM: u8 = 16;

/// Deepest zoom level lookups can be made at.
pub const MAX_ZOOM: u8 = 24;

/// Terrarium tiles hosted on AWS open data. Available to zoom 15.
pub const TERRARIUM_URL: &str =
    "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    /// URL with `{z}`, `{x}` and `{y}` placeholders.
    template: String,

    /// How to decode fetched bytes.
    codec: Codec,

    /// Zoom level all lookups are made at.
    zoom: u8,

    /// Reject tiles which aren't this many samples wide.
    expected_width: Option<usize>,
}

impl TileSource {
    pub fn new(template: impl Into<String>, codec: Codec) -> Self {
        Self {
            template: template.into(),
            codec,
            zoom: DEFAULT_ZOOM,
            expected_width: None,
        }
    }

    pub fn terrarium() -> Self {
        Self::new(TERRARIUM_URL, Codec::Terrarium)
            .zoom(15)
            .expected_width(256)
    }

    /// Sets the lookup zoom level, capped at [`MAX_ZOOM`].
    pub fn zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom.min(MAX_ZOOM);
        self
    }

    pub fn expected_width(mut self, width: usize) -> Self {
        self.expected_width = Some(width);
        self
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn width(&self) -> Option<usize> {
        self.expected_width
    }

    pub fn url(&self, TileKey { x, y, z }: TileKey) -> String {
        self.template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}
