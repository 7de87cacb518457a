use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand, ValueEnum};
use geo::geometry::Point;
use std::{path::PathBuf, str::FromStr};
use terrain::{Codec, MAX_ZOOM};

/// Find golf courses, group their features by hole and measure
/// yardages.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Feature cache file. Created if missing.
    #[arg(long, default_value = "caddie-cache.json")]
    pub cache: PathBuf,

    /// Overpass API interpreter endpoint.
    #[arg(long, default_value = overpass::DEFAULT_URL)]
    pub overpass_url: String,

    /// Elevation tile encoding.
    #[arg(long, value_enum, default_value_t = Dem::Terrarium)]
    pub dem: Dem,

    /// Elevation tile URL with "{z}", "{x}" and "{y}" placeholders.
    /// Required unless `--dem` is terrarium.
    #[arg(long)]
    pub dem_url: Option<String>,

    /// Zoom level to fetch elevation tiles at, up to 24.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_ZOOM)))]
    pub dem_zoom: Option<u8>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dem {
    Terrarium,
    TerrainRgb,
    Hgt,
    F32,
}

impl From<Dem> for Codec {
    fn from(dem: Dem) -> Codec {
        match dem {
            Dem::Terrarium => Codec::Terrarium,
            Dem::TerrainRgb => Codec::TerrainRgb,
            Dem::Hgt => Codec::Hgt,
            Dem::F32 => Codec::F32,
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq)]
pub struct LatLon(pub Point);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lat,lon"))?;
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        Ok(Self(Point::new(lon, lat)))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List golf courses around a "lat,lon".
    Courses {
        center: LatLon,

        /// Width and height of the searched area, in degrees.
        #[arg(long, default_value_t = 0.1)]
        span: f64,
    },

    /// Load a course and print its holes.
    Course {
        /// Where you are, as "lat,lon".
        near: LatLon,

        /// Course to load instead of the one at `near`.
        #[arg(long)]
        id: Option<String>,

        /// Comma separated strokes for holes 1 onward.
        #[arg(long, value_delimiter = ',')]
        strokes: Vec<u32>,
    },

    /// Print the ground elevation, in meters, of each "lat,lon".
    Elevation { points: Vec<LatLon> },

    /// Measure the path from a location through waypoints, all
    /// "lat,lon".
    Path {
        location: LatLon,

        #[arg(required = true)]
        waypoints: Vec<LatLon>,
    },

    /// Empty the feature cache.
    ClearCache,
}

#[cfg(test)]
mod tests {
    use super::{Cli, LatLon};
    use clap::Parser;
    use std::str::FromStr;

    #[test]
    fn test_dem_zoom_is_bounded() {
        let parse = |zoom: &str| {
            Cli::try_parse_from(["caddie", "--dem-zoom", zoom, "clear-cache"])
                .map(|cli| cli.dem_zoom)
        };
        assert_eq!(parse("16").unwrap(), Some(16));
        assert!(parse("24").is_ok());
        assert!(parse("32").is_err());
    }

    #[test]
    fn test_parse_lat_lon() {
        let LatLon(p) = LatLon::from_str("41.25, -73.5").unwrap();
        assert_eq!((p.x(), p.y()), (-73.5, 41.25));
        assert!(LatLon::from_str("41.25").is_err());
        assert!(LatLon::from_str("north,west").is_err());
    }
}
