use geo::{
    coord,
    geometry::{Point, Rect},
    Intersects,
};
use terrain::math::haversine_distance;

/// The live location is measured from as long as it's within this
/// distance of the viewport center, even when off screen.
pub const LOCATION_RADIUS_M: f64 = 1000.0;

/// The visible map area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Rect,
}

impl Viewport {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    /// A `width` by `height` degree viewport centered on `center`.
    pub fn around(center: Point, width: f64, height: f64) -> Self {
        let (dx, dy) = (width / 2.0, height / 2.0);
        Self::new(Rect::new(
            coord!(x: center.x() - dx, y: center.y() - dy),
            coord!(x: center.x() + dx, y: center.y() + dy),
        ))
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.bounds.center().into()
    }

    /// Moves the viewport, keeping its size, so it's centered on
    /// `center`.
    pub fn recenter(&mut self, center: Point) {
        *self = Self::around(center, self.bounds.width(), self.bounds.height());
    }

    /// Returns true if the live location at `location` belongs on the
    /// measured path.
    pub fn includes_location(&self, location: Point) -> bool {
        self.bounds.intersects(&location)
            || haversine_distance(self.center(), location) < LOCATION_RADIUS_M
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;
    use approx::assert_relative_eq;
    use geo::point;

    #[test]
    fn test_includes_location() {
        // Roughly 170 m tall.
        let view = Viewport::around(point!(x: -73.5, y: 41.25), 0.002, 0.0015);
        assert!(view.includes_location(point!(x: -73.5005, y: 41.2501)));
        // Off screen, but about 555 m from center.
        assert!(view.includes_location(point!(x: -73.5, y: 41.255)));
        // About 5.5 km away.
        assert!(!view.includes_location(point!(x: -73.5, y: 41.3)));
    }

    #[test]
    fn test_recenter_keeps_size() {
        let mut view = Viewport::around(point!(x: 0.0, y: 0.0), 0.002, 0.001);
        view.recenter(point!(x: 1.0, y: 2.0));
        assert_relative_eq!(view.center().x(), 1.0);
        assert_relative_eq!(view.center().y(), 2.0);
        assert_relative_eq!(view.bounds().width(), 0.002, epsilon = 1e-12);
        assert_relative_eq!(view.bounds().height(), 0.001, epsilon = 1e-12);
    }
}
