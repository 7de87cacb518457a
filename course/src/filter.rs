//! Narrowing a radius query down to features that belong to a course.

use crate::{Category, CourseError, CourseFeature};
use geo::{geometry::Geometry, Relate};
use log::debug;
use overpass::Feature;

/// Returns the features lying within `course_id`'s boundary, minus the
/// boundary itself, driving ranges, and anything on a driving range.
///
/// Only areas and lines are kept.
pub fn on_course_features(
    course_id: &str,
    features: Vec<Feature>,
) -> Result<Vec<CourseFeature>, CourseError> {
    let features: Vec<CourseFeature> = features.into_iter().map(CourseFeature::from).collect();

    let boundary = features
        .iter()
        .find(|cf| cf.feature.id == course_id)
        .map(|cf| cf.feature.geometry.clone())
        .ok_or_else(|| CourseError::MissingBoundary(course_id.to_owned()))?;

    let ranges: Vec<Geometry> = features
        .iter()
        .filter(|cf| cf.category == Category::DrivingRange)
        .map(|cf| cf.feature.geometry.clone())
        .collect();

    Ok(features
        .into_iter()
        .filter(|cf| on_course(cf, &boundary))
        .filter(|cf| {
            let on_range = ranges.iter().any(|range| within(&cf.feature.geometry, range));
            if on_range {
                debug!("{} is on a driving range", cf.feature.id);
            }
            !on_range
        })
        .collect())
}

fn on_course(cf: &CourseFeature, boundary: &Geometry) -> bool {
    match cf.category {
        Category::Boundary | Category::DrivingRange => false,
        _ => match cf.feature.geometry {
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::LineString(_) => {
                let inside = within(&cf.feature.geometry, boundary);
                if !inside {
                    debug!("excluding {}, outside course", cf.feature.id);
                }
                inside
            }
            _ => {
                debug!("excluding {}, not an area or line", cf.feature.id);
                false
            }
        },
    }
}

fn within(a: &Geometry, b: &Geometry) -> bool {
    a.relate(b).is_within()
}

#[cfg(test)]
mod tests {
    use super::on_course_features;
    use crate::{Category, CourseError};
    use geo::{line_string, point, polygon, Polygon};
    use overpass::Feature;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    fn course() -> Vec<Feature> {
        vec![
            Feature::new("way/1", square(0.0, 0.0, 0.01))
                .with_tag("leisure", "golf_course")
                .with_tag("name", "Test"),
            Feature::new("way/2", line_string![(x: 0.001, y: 0.001), (x: 0.001, y: 0.004)])
                .with_tag("golf", "hole")
                .with_tag("ref", "1"),
            Feature::new("way/3", square(0.002, 0.002, 0.0002)).with_tag("golf", "bunker"),
            // Straddles the boundary.
            Feature::new("way/4", square(0.0095, 0.005, 0.001)).with_tag("golf", "green"),
            // Neighboring course.
            Feature::new("way/5", square(0.02, 0.02, 0.001)).with_tag("golf", "tee"),
            Feature::new("way/6", square(0.006, 0.006, 0.003)).with_tag("golf", "driving_range"),
            Feature::new("way/7", square(0.007, 0.007, 0.0005)).with_tag("golf", "tee"),
            Feature::new("node/8", point!(x: 0.003, y: 0.003)).with_tag("golf", "pin"),
        ]
    }

    #[test]
    fn test_filters_to_course() {
        let kept = on_course_features("way/1", course()).unwrap();
        let ids: Vec<&str> = kept.iter().map(|cf| cf.feature.id.as_str()).collect();
        assert_eq!(ids, ["way/2", "way/3"]);
        assert_eq!(kept[0].category, Category::Hole);
        assert_eq!(kept[1].category, Category::Bunker);
    }

    #[test]
    fn test_missing_boundary() {
        assert!(matches!(
            on_course_features("way/99", course()),
            Err(CourseError::MissingBoundary(id)) if id == "way/99"
        ));
    }
}
