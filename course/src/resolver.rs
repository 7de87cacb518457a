//! Course discovery and loading.

use crate::{
    filter::on_course_features, hole::partition, name::shorten, Category, CourseError,
    CourseFeature, LoadedCourse,
};
use geo::{
    coord,
    geometry::{Point, Rect},
    Centroid,
};
use log::{debug, info, warn};
use netcache::FeatureCache;
use overpass::{osm_id, query, GeoQuery};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use terrain::math::haversine_distance;

/// Course ids are OpenStreetMap ids such as `"way/123"`.
pub type CourseId = String;

/// Radius around a course's centroid searched for its features.
pub const FEATURE_RADIUS_M: f64 = 5000.0;

/// How close a position must be to a course's centroid to count as
/// being at the course.
pub const AT_COURSE_M: f64 = 1000.0;

/// Size in degrees of the grid cells courses are discovered in.
pub const DISCOVERY_TILE_DEG: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownCourse {
    /// Empty when the course is unnamed.
    pub name: String,

    pub centroid: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseMarker {
    pub id: CourseId,
    pub short: String,
    pub centroid: Point,
}

/// Owns the session's known courses and the currently loaded one.
pub struct CourseResolver {
    geo: Arc<dyn GeoQuery>,
    cache: FeatureCache,
    known: BTreeMap<CourseId, KnownCourse>,
    loaded: Option<LoadedCourse>,
}

impl CourseResolver {
    pub fn new(geo: Arc<dyn GeoQuery>, cache: FeatureCache) -> Self {
        Self {
            geo,
            cache,
            known: BTreeMap::new(),
            loaded: None,
        }
    }

    pub fn known_courses(&self) -> &BTreeMap<CourseId, KnownCourse> {
        &self.known
    }

    /// Adds `course` to the known courses.
    pub fn register(&mut self, id: impl Into<CourseId>, course: KnownCourse) {
        self.known.insert(id.into(), course);
    }

    pub fn loaded(&self) -> Option<&LoadedCourse> {
        self.loaded.as_ref()
    }

    /// Queries for golf courses intersecting `bounds`.
    ///
    /// Doesn't touch the known courses.
    pub async fn find_courses_in_bounds(
        &self,
        bounds: Rect,
    ) -> Result<BTreeMap<CourseId, KnownCourse>, CourseError> {
        let filter = query::bbox("nwr", ("leisure", "golf_course"), bounds);
        let mut courses = BTreeMap::new();
        for feature in self.geo.query(&filter).await? {
            let Some(centroid) = feature.geometry.centroid() else {
                warn!("{} has no centroid", feature.id);
                continue;
            };
            let name = feature.tag("name").unwrap_or_default().to_owned();
            debug!(
                "{} / {} / {:.4},{:.4}",
                feature.id,
                if name.is_empty() { "UNNAMED" } else { &name },
                centroid.x(),
                centroid.y()
            );
            courses.insert(feature.id, KnownCourse { name, centroid });
        }
        Ok(courses)
    }

    /// Finds courses in the grid cells covering `bounds`, remembering
    /// them as known courses.
    ///
    /// Each cell's results are cached so panning back over an area
    /// doesn't query again.
    pub async fn discover(&mut self, bounds: Rect) -> Result<Vec<CourseMarker>, CourseError> {
        let mut markers = Vec::new();
        for cell in discovery_cells(bounds) {
            let (min, max) = (cell.min(), cell.max());
            let key = format!("courses/{},{},{},{}", min.y, min.x, max.y, max.x);
            let courses: BTreeMap<CourseId, KnownCourse> = self
                .cache
                .cache_json(&key, || self.find_courses_in_bounds(cell))
                .await?;
            for (id, course) in courses {
                markers.push(CourseMarker {
                    id: id.clone(),
                    short: shorten(&course.name),
                    centroid: course.centroid,
                });
                self.known.insert(id, course);
            }
        }
        Ok(markers)
    }

    /// Loads the features of course `id` and groups them by hole.
    ///
    /// Loading the course that's already loaded does nothing. On
    /// failure the previously loaded course stays loaded.
    pub async fn load_course(&mut self, id: &str) -> Result<&LoadedCourse, CourseError> {
        if self.loaded.as_ref().is_some_and(|course| course.id == id) {
            debug!("{id} already loaded");
        } else {
            let course = self.resolve(id).await?;
            self.loaded = Some(course);
        }
        self.loaded
            .as_ref()
            .ok_or_else(|| CourseError::UnknownCourse(id.to_owned()))
    }

    pub fn unload_course(&mut self) {
        self.loaded = None;
    }

    /// Returns true if `position` is within [`AT_COURSE_M`] of course
    /// `id`'s centroid.
    pub fn at_course(&self, position: Point, id: &str) -> bool {
        self.at_course_within(position, id, AT_COURSE_M)
    }

    /// Returns true if `position` is within `threshold_m` of course
    /// `id`'s centroid. Unknown courses are never nearby.
    pub fn at_course_within(&self, position: Point, id: &str, threshold_m: f64) -> bool {
        self.known
            .get(id)
            .is_some_and(|course| haversine_distance(position, course.centroid) < threshold_m)
    }

    /// Loads the first known course `position` is at, if any.
    pub async fn load_nearby_course(
        &mut self,
        position: Point,
    ) -> Result<Option<CourseId>, CourseError> {
        let Some(id) = self
            .known
            .keys()
            .find(|id| self.at_course(position, id))
            .cloned()
        else {
            return Ok(None);
        };
        self.load_course(&id).await?;
        Ok(Some(id))
    }
}

/// Private API.
impl CourseResolver {
    async fn resolve(&self, id: &str) -> Result<LoadedCourse, CourseError> {
        let course = self
            .known
            .get(id)
            .ok_or_else(|| CourseError::UnknownCourse(id.to_owned()))?;
        let key = format!("course/{id}");
        let features: Vec<CourseFeature> = self
            .cache
            .cache_json(&key, || self.query_course_features(id, course.centroid))
            .await?;
        let holes = partition(&features);
        info!(
            "loaded {id} ({}): {} features, {} holes",
            course.name,
            features.len(),
            holes.len()
        );
        Ok(LoadedCourse {
            id: id.to_owned(),
            name: course.name.clone(),
            holes,
        })
    }

    async fn query_course_features(
        &self,
        id: &str,
        centroid: Point,
    ) -> Result<Vec<CourseFeature>, CourseError> {
        let numeric_id = osm_id(id).ok_or_else(|| CourseError::UnknownCourse(id.to_owned()))?;
        let parts = Category::QUERIED
            .iter()
            .map(|&(element, value)| {
                query::around(element, ("golf", value), FEATURE_RADIUS_M, centroid)
            })
            .chain(std::iter::once(query::by_id(numeric_id)));
        let features = self.geo.query(&query::union(parts)).await?;
        on_course_features(id, features)
    }
}

/// Returns the grid cells, south to north then west to east, covering
/// `bounds` once snapped outward to [`DISCOVERY_TILE_DEG`].
pub fn discovery_cells(bounds: Rect) -> Vec<Rect> {
    let size = DISCOVERY_TILE_DEG;
    let dn = |v: f64| (v / size).floor() * size;
    let up = |v: f64| ((v + size) / size).floor() * size;
    let (min, max) = (bounds.min(), bounds.max());
    let (south, west, north, east) = (dn(min.y), dn(min.x), up(max.y), up(max.x));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (rows, cols) = (
        ((north - south) / size).round() as usize,
        ((east - west) / size).round() as usize,
    );
    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        #[allow(clippy::cast_precision_loss)]
        let s = south + row as f64 * size;
        for col in 0..cols {
            #[allow(clippy::cast_precision_loss)]
            let w = west + col as f64 * size;
            cells.push(Rect::new(coord!(x: w, y: s), coord!(x: w + size, y: s + size)));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::{discovery_cells, CourseResolver, KnownCourse};
    use crate::CourseError;
    use async_trait::async_trait;
    use geo::{coord, line_string, point, polygon, Polygon, Rect};
    use netcache::{FeatureCache, KvStore, MemoryStore};
    use overpass::{Feature, GeoQuery, QueryError};
    use std::{
        f64::consts::PI,
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };
    use terrain::constants::MEAN_EARTH_RADIUS;

    const M_PER_DEG: f64 = MEAN_EARTH_RADIUS * PI / 180.0;

    /// Answers course searches with one course and everything else
    /// with a fixed feature set.
    #[derive(Default)]
    struct FakeGeo {
        features: Vec<Feature>,
        queries: AtomicUsize,
        filters: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl GeoQuery for FakeGeo {
        async fn query(&self, filter: &str) -> Result<Vec<Feature>, QueryError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.filters.lock().unwrap().push(filter.to_owned());
            if self.fail.load(Ordering::SeqCst) {
                return Err(QueryError::Remark("runtime error: timeout".into()));
            }
            if filter.contains("leisure=golf_course") {
                Ok(vec![boundary()])
            } else {
                Ok(self.features.clone())
            }
        }
    }

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    fn boundary() -> Feature {
        Feature::new("way/1", square(0.0, 0.0, 0.02))
            .with_tag("leisure", "golf_course")
            .with_tag("name", "Hollow Brook Golf Club")
    }

    /// A small bunker `east_m` east of hole 1's centerline.
    fn bunker(id: &str, east_m: f64) -> Feature {
        Feature::new(id, square(0.001 + east_m / M_PER_DEG, 0.004, 0.000_02))
            .with_tag("golf", "bunker")
    }

    fn features() -> Vec<Feature> {
        vec![
            boundary(),
            Feature::new("way/2", line_string![(x: 0.001, y: 0.001), (x: 0.001, y: 0.008)])
                .with_tag("golf", "hole")
                .with_tag("ref", "1")
                .with_tag("par", "4"),
            bunker("way/3", 30.0),
            bunker("way/4", 500.0),
        ]
    }

    fn resolver(geo: Arc<FakeGeo>, store: Arc<MemoryStore>) -> CourseResolver {
        let mut resolver = CourseResolver::new(geo, FeatureCache::new(store));
        resolver.register(
            "way/1",
            KnownCourse {
                name: "Hollow Brook Golf Club".into(),
                centroid: point!(x: 0.01, y: 0.01),
            },
        );
        resolver
    }

    fn fake(features: Vec<Feature>) -> Arc<FakeGeo> {
        Arc::new(FakeGeo {
            features,
            ..FakeGeo::default()
        })
    }

    #[tokio::test]
    async fn test_load_course_assigns_near_bunker_only() {
        let geo = fake(features());
        let mut resolver = resolver(geo.clone(), Arc::new(MemoryStore::new()));
        let course = resolver.load_course("way/1").await.unwrap();
        assert_eq!(course.name, "Hollow Brook Golf Club");
        assert_eq!(course.holes.len(), 1);
        let ids: Vec<&str> = course.holes[&1]
            .features
            .iter()
            .map(|cf| cf.feature.id.as_str())
            .collect();
        assert_eq!(ids, ["way/3"]);

        let filter = geo.filters.lock().unwrap()[0].clone();
        assert!(filter.contains("way[golf=\"hole\"](around:5000,0.01,0.01);"));
        assert!(filter.contains("nwr[golf=\"fairway\"](around:5000,0.01,0.01);"));
        assert!(filter.contains("nwr(1);"));
    }

    #[tokio::test]
    async fn test_load_course_is_idempotent() {
        let geo = fake(features());
        let store = Arc::new(MemoryStore::new());
        let mut resolver = resolver(geo.clone(), store.clone());
        let first = resolver.load_course("way/1").await.unwrap().clone();
        let second = resolver.load_course("way/1").await.unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(geo.queries.load(Ordering::SeqCst), 1);

        // Unloading keeps the cache.
        resolver.unload_course();
        assert!(resolver.loaded().is_none());
        let third = resolver.load_course("way/1").await.unwrap().clone();
        assert_eq!(first, third);
        assert_eq!(geo.queries.load(Ordering::SeqCst), 1);
        assert!(store.get("course/way/1").unwrap().is_some());

        // So does a new session over the same store.
        let mut resolver = self::resolver(geo.clone(), store);
        assert_eq!(resolver.load_course("way/1").await.unwrap(), &first);
        assert_eq!(geo.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_course_and_cache() {
        let geo = fake(features());
        let store = Arc::new(MemoryStore::new());
        let mut resolver = resolver(geo.clone(), store.clone());
        resolver.load_course("way/1").await.unwrap();
        resolver.register(
            "way/9",
            KnownCourse {
                name: "Other".into(),
                centroid: point!(x: 1.0, y: 1.0),
            },
        );

        geo.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            resolver.load_course("way/9").await,
            Err(CourseError::Query(_))
        ));
        assert_eq!(resolver.loaded().map(|c| c.id.as_str()), Some("way/1"));
        assert!(store.get("course/way/9").unwrap().is_none());

        // Query succeeds but the boundary isn't in it.
        geo.fail.store(false, Ordering::SeqCst);
        assert!(matches!(
            resolver.load_course("way/9").await,
            Err(CourseError::MissingBoundary(_))
        ));
        assert!(store.get("course/way/9").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let mut resolver = resolver(fake(features()), Arc::new(MemoryStore::new()));
        assert!(matches!(
            resolver.load_course("way/404").await,
            Err(CourseError::UnknownCourse(_))
        ));
    }

    #[tokio::test]
    async fn test_course_without_holes_loads_empty() {
        let mut resolver = resolver(fake(vec![boundary()]), Arc::new(MemoryStore::new()));
        let course = resolver.load_course("way/1").await.unwrap();
        assert!(course.holes.is_empty());
    }

    #[tokio::test]
    async fn test_discover_caches_cells() {
        let geo = fake(Vec::new());
        let store = Arc::new(MemoryStore::new());
        let mut resolver = CourseResolver::new(geo.clone(), FeatureCache::new(store.clone()));
        let view = Rect::new(coord!(x: 0.01, y: 0.01), coord!(x: 0.02, y: 0.02));

        let markers = resolver.discover(view).await.unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, "way/1");
        assert_eq!(markers[0].short, "HB");
        assert!(resolver.known_courses().contains_key("way/1"));
        assert!(store.get("courses/0,0,0.25,0.25").unwrap().is_some());

        resolver.discover(view).await.unwrap();
        assert_eq!(geo.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_discovery_is_not_cached() {
        let geo = fake(Vec::new());
        geo.fail.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryStore::new());
        let mut resolver = CourseResolver::new(geo.clone(), FeatureCache::new(store.clone()));
        let view = Rect::new(coord!(x: 0.01, y: 0.01), coord!(x: 0.02, y: 0.02));
        assert!(matches!(
            resolver.discover(view).await,
            Err(CourseError::Query(QueryError::Remark(_)))
        ));
        assert!(store.get("courses/0,0,0.25,0.25").unwrap().is_none());

        geo.fail.store(false, Ordering::SeqCst);
        assert_eq!(resolver.discover(view).await.unwrap().len(), 1);
        assert_eq!(geo.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_nearby_course() {
        let geo = fake(features());
        let mut resolver = resolver(geo, Arc::new(MemoryStore::new()));
        let on_course = point!(x: 0.012, y: 0.011);
        let far_away = point!(x: 0.2, y: 0.2);
        assert!(resolver.at_course(on_course, "way/1"));
        assert!(!resolver.at_course(far_away, "way/1"));
        assert!(!resolver.at_course(on_course, "way/404"));
        assert!(resolver.at_course_within(far_away, "way/1", 50_000.0));

        assert_eq!(resolver.load_nearby_course(far_away).await.unwrap(), None);
        assert!(resolver.loaded().is_none());
        assert_eq!(
            resolver.load_nearby_course(on_course).await.unwrap().as_deref(),
            Some("way/1")
        );
        assert_eq!(resolver.loaded().map(|c| c.id.as_str()), Some("way/1"));
    }

    #[test]
    fn test_discovery_cells() {
        let view = Rect::new(coord!(x: -73.6, y: 41.1), coord!(x: -73.4, y: 41.3));
        let cells = discovery_cells(view);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].min(), coord!(x: -73.75, y: 41.0));
        assert_eq!(cells[1].min(), coord!(x: -73.5, y: 41.0));
        assert_eq!(cells[3].max(), coord!(x: -73.25, y: 41.5));
    }
}
