use geo::geometry::Point;
use serde::Serialize;
use terrain::{
    constants::{FEET_PER_METER, METERS_PER_YARD},
    math::haversine_distance,
};

/// One leg of a path.
///
/// Nothing is rounded; that's up to whoever displays it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,

    /// Great circle distance.
    pub distance_yd: f64,

    /// Positive going uphill.
    pub elevation_change_ft: f64,

    /// Distance adjusted by a third of a yard per foot of climb.
    pub plays_like_yd: f64,
}

impl Segment {
    pub fn new(from: Point, to: Point, from_elevation_m: f64, to_elevation_m: f64) -> Self {
        let distance_yd = haversine_distance(from, to) / METERS_PER_YARD;
        let elevation_change_ft = (to_elevation_m - from_elevation_m) * FEET_PER_METER;
        Self {
            from,
            to,
            distance_yd,
            elevation_change_ft,
            plays_like_yd: distance_yd + elevation_change_ft / 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Segment;
    use approx::assert_relative_eq;
    use geo::point;

    #[test]
    fn test_uphill_plays_longer() {
        let a = point!(x: -73.5, y: 41.25);
        let b = point!(x: -73.5, y: 41.2515);
        let seg = Segment::new(a, b, 100.0, 110.0);
        assert_relative_eq!(seg.elevation_change_ft, 32.8084, epsilon = 1e-9);
        assert_relative_eq!(seg.plays_like_yd, seg.distance_yd + 32.8084 / 3.0, epsilon = 1e-9);
        assert!(seg.distance_yd > 180.0 && seg.distance_yd < 185.0);
    }

    #[test]
    fn test_plays_like_symmetry() {
        let a = point!(x: -73.5, y: 41.25);
        let b = point!(x: -73.498, y: 41.2512);
        let there = Segment::new(a, b, 52.0, 40.5);
        let back = Segment::new(b, a, 40.5, 52.0);
        assert_relative_eq!(there.distance_yd, back.distance_yd, max_relative = 1e-12);
        assert_relative_eq!(there.elevation_change_ft, -back.elevation_change_ft);
        assert_relative_eq!(
            there.plays_like_yd + back.plays_like_yd,
            2.0 * there.distance_yd,
            max_relative = 1e-12
        );
    }
}
