//! These routines are taken from the [geo] crate, modified to better
//! fit our use-case.
//!
//! [geo](https://github.com/georust/geo/blob/eb0cd98f3ccfa226631af23d94d66d214ea66488/geo/src/algorithm/haversine_distance.rs)

use crate::constants::MEAN_EARTH_RADIUS;
use geo::geometry::Point;

/// Returns the great circle distance between `a` and `b` in meters.
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let theta1 = a.y().to_radians();
    let theta2 = b.y().to_radians();
    let delta_theta = (b.y() - a.y()).to_radians();
    let delta_lambda = (b.x() - a.x()).to_radians();
    let h = (delta_theta / 2.0).sin().powi(2)
        + theta1.cos() * theta2.cos() * (delta_lambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().asin() * MEAN_EARTH_RADIUS
}

/// Returns the initial bearing from `a` to `b` in degrees, in the
/// range (-180, 180], where 0 is north and 90 east.
pub fn bearing(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let delta_lon = (b.x() - a.x()).to_radians();
    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    y.atan2(x).to_degrees()
}
