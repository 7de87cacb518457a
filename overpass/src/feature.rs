use geo::geometry::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Tags = BTreeMap<String, String>;

/// A tagged OpenStreetMap element with resolved geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// `"node/<n>"`, `"way/<n>"` or `"relation/<n>"`.
    pub id: String,

    /// Coordinates are `x`: longitude, `y`: latitude.
    pub geometry: Geometry<f64>,

    #[serde(default)]
    pub properties: Tags,
}

impl Feature {
    pub fn new(id: impl Into<String>, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            id: id.into(),
            geometry: geometry.into(),
            properties: Tags::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns the numeric part of this feature's id.
    pub fn osm_id(&self) -> Option<i64> {
        osm_id(&self.id)
    }
}

/// Returns the numeric part of an id such as `"way/123"`.
pub fn osm_id(id: &str) -> Option<i64> {
    id.rsplit_once('/')
        .map_or(id, |(_, n)| n)
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{osm_id, Feature};
    use geo::point;

    #[test]
    fn test_osm_id() {
        assert_eq!(osm_id("way/123"), Some(123));
        assert_eq!(osm_id("relation/9"), Some(9));
        assert_eq!(osm_id("77"), Some(77));
        assert_eq!(osm_id("way/x"), None);
    }

    #[test]
    fn test_tags() {
        let f = Feature::new("node/1", point!(x: 1.0, y: 2.0))
            .with_tag("golf", "pin")
            .with_tag("ref", "3");
        assert_eq!(f.tag("golf"), Some("pin"));
        assert_eq!(f.tag("par"), None);
        assert_eq!(f.osm_id(), Some(1));
    }

    #[test]
    fn test_json_round_trip_keeps_geometry() {
        let f = Feature::new("node/1", point!(x: -71.3, y: 44.27)).with_tag("golf", "pin");
        let text = serde_json::to_string(&f).unwrap();
        assert_eq!(serde_json::from_str::<Feature>(&text).unwrap(), f);
    }
}
