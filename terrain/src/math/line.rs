use crate::constants::MEAN_EARTH_RADIUS;
use geo::geometry::{Coord, LineString, Point};
use std::f64::consts::PI;

/// Returns the shortest distance in meters from `p` to any segment of
/// `line`.
///
/// Segments are measured on a local equirectangular projection
/// centered on `p`, which is accurate to well under a meter over the
/// few hundred meters this is used for. An empty line is infinitely
/// far away.
pub fn point_to_line_distance(p: Point, line: &LineString) -> f64 {
    let m_per_deg = MEAN_EARTH_RADIUS * PI / 180.0;
    let cos_lat = p.y().to_radians().cos();
    let project = |c: Coord| Coord {
        x: (c.x - p.x()) * cos_lat * m_per_deg,
        y: (c.y - p.y()) * m_per_deg,
    };
    match line.0.as_slice() {
        [] => f64::INFINITY,
        [only] => {
            let c = project(*only);
            c.x.hypot(c.y)
        }
        _ => line
            .lines()
            .map(|seg| origin_to_segment(project(seg.start), project(seg.end)))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Distance from the origin to segment `ab`.
fn origin_to_segment(a: Coord, b: Coord) -> f64 {
    let d = b - a;
    let len2 = d.x * d.x + d.y * d.y;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (-(a.x * d.x + a.y * d.y) / len2).clamp(0.0, 1.0)
    };
    (a.x + t * d.x).hypot(a.y + t * d.y)
}

#[cfg(test)]
mod tests {
    use super::point_to_line_distance;
    use crate::{constants::MEAN_EARTH_RADIUS, math::haversine_distance};
    use approx::assert_relative_eq;
    use geo::{line_string, point, LineString};
    use std::f64::consts::PI;

    const M_PER_DEG: f64 = MEAN_EARTH_RADIUS * PI / 180.0;

    #[test]
    fn test_perpendicular() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.01)];
        let p = point!(x: 30.0 / M_PER_DEG, y: 0.005);
        assert_relative_eq!(point_to_line_distance(p, &line), 30.0, epsilon = 1e-6);
    }

    #[test]
    fn test_past_the_end_measures_to_endpoint() {
        let line = line_string![(x: -73.5, y: 41.25), (x: -73.5, y: 41.252)];
        let p = point!(x: -73.5005, y: 41.2535);
        let end = point!(x: -73.5, y: 41.252);
        assert_relative_eq!(
            point_to_line_distance(p, &line),
            haversine_distance(p, end),
            max_relative = 1e-3
        );
    }

    #[test]
    fn test_nearest_of_many_segments() {
        let line = line_string![
            (x: 0.0, y: 0.0),
            (x: 0.01, y: 0.0),
            (x: 0.01, y: 0.01),
        ];
        let p = point!(x: 0.01 + 50.0 / M_PER_DEG, y: 0.005);
        assert_relative_eq!(point_to_line_distance(p, &line), 50.0, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_lines() {
        let p = point!(x: 0.0, y: 0.0);
        assert_eq!(point_to_line_distance(p, &LineString::new(vec![])), f64::INFINITY);
        let single = line_string![(x: 0.0, y: 20.0 / M_PER_DEG)];
        assert_relative_eq!(point_to_line_distance(p, &single), 20.0, epsilon = 1e-9);
    }
}
