use overpass::Feature;
use serde::{Deserialize, Serialize};

/// What a course feature is, decided once when features come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hole,
    Tee,
    Fairway,
    Bunker,
    Green,
    DrivingRange,
    Boundary,
    Unknown,
}

impl Category {
    pub fn of(feature: &Feature) -> Self {
        if feature.tag("leisure") == Some("golf_course") {
            return Self::Boundary;
        }
        match feature.tag("golf") {
            Some("hole") => Self::Hole,
            Some("tee") => Self::Tee,
            Some("fairway") => Self::Fairway,
            Some("bunker") => Self::Bunker,
            Some("green") => Self::Green,
            Some("driving_range") => Self::DrivingRange,
            _ => Self::Unknown,
        }
    }

    /// The `golf=*` values queried for around a course.
    pub const QUERIED: [(&'static str, &'static str); 6] = [
        ("way", "hole"),
        ("way", "tee"),
        ("nwr", "fairway"),
        ("way", "bunker"),
        ("way", "green"),
        ("way", "driving_range"),
    ];
}

/// A feature tagged with its [`Category`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseFeature {
    pub category: Category,
    pub feature: Feature,
}

impl From<Feature> for CourseFeature {
    fn from(feature: Feature) -> Self {
        Self {
            category: Category::of(&feature),
            feature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Category;
    use geo::point;
    use overpass::Feature;

    fn tagged(key: &str, value: &str) -> Feature {
        Feature::new("way/1", point!(x: 0.0, y: 0.0)).with_tag(key, value)
    }

    #[test]
    fn test_category_of() {
        assert_eq!(Category::of(&tagged("golf", "hole")), Category::Hole);
        assert_eq!(Category::of(&tagged("golf", "bunker")), Category::Bunker);
        assert_eq!(
            Category::of(&tagged("golf", "driving_range")),
            Category::DrivingRange
        );
        assert_eq!(
            Category::of(&tagged("leisure", "golf_course")),
            Category::Boundary
        );
        assert_eq!(Category::of(&tagged("golf", "rough")), Category::Unknown);
        assert_eq!(Category::of(&tagged("natural", "water")), Category::Unknown);
    }
}
