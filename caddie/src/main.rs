mod options;

use anyhow::{anyhow, Error as AnyError};
use clap::Parser;
use course::{marker_label, Category, CourseResolver, LoadedCourse, Scorecard};
use geo::{coord, geometry::Rect, Point};
use log::info;
use netcache::{FeatureCache, FileStore, HttpTransport, SharedFetch, Transport};
use options::{Cli, Command as CliCmd, Dem, LatLon};
use overpass::Overpass;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use terrain::{ElevationSource, TileSource, Tiles};
use yardage::{PathEngine, Position};

/// Bump when the shape of cached features changes.
const CACHE_VERSION: u32 = 1;

/// Searched area when loading the course you're at.
const NEARBY_SPAN_DEG: f64 = 0.05;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    let Cli {
        cache,
        overpass_url,
        dem,
        dem_url,
        dem_zoom,
        cmd,
    } = Cli::parse();

    env_logger::init();

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());
    let store = Arc::new(FileStore::open(&cache)?);

    match cmd {
        CliCmd::ClearCache => {
            FeatureCache::open(store, CACHE_VERSION)?.clear()?;
            info!("cleared {}", cache.display());
        }
        CliCmd::Courses { center, span } => {
            let mut resolver = resolver(transport, store, overpass_url)?;
            let markers = resolver.discover(around(center, span)).await?;
            let markers: Vec<_> = markers
                .into_iter()
                .map(|marker| {
                    let name = resolver
                        .known_courses()
                        .get(&marker.id)
                        .map(|course| course.name.clone())
                        .unwrap_or_default();
                    json!({
                        "id": marker.id,
                        "name": name,
                        "label": marker_label(&marker.short),
                        "location": [marker.centroid.y(), marker.centroid.x()],
                    })
                })
                .collect();
            print_json(&markers)?;
        }
        CliCmd::Course { near, id, strokes } => {
            let mut resolver = resolver(transport, store, overpass_url)?;
            resolver.discover(around(near, NEARBY_SPAN_DEG)).await?;
            let course = match id {
                Some(id) => resolver.load_course(&id).await?,
                None => {
                    resolver
                        .load_nearby_course(near.0)
                        .await?
                        .ok_or_else(|| anyhow!("no course near {:?}", near.0))?;
                    resolver
                        .loaded()
                        .ok_or_else(|| anyhow!("course failed to load"))?
                }
            };
            print_json(&course_summary(course, &strokes))?;
        }
        CliCmd::Elevation { points } => {
            let tiles = tiles(transport, dem, dem_url, dem_zoom)?;
            let mut out = Vec::with_capacity(points.len());
            for LatLon(point) in points {
                let elevation = tiles.elevation(point.0).await?;
                out.push(json!({
                    "location": [point.y(), point.x()],
                    "elevation": elevation,
                }));
            }
            print_json(&out)?;
        }
        CliCmd::Path {
            location: LatLon(location),
            waypoints,
        } => {
            let tiles = tiles(transport, dem, dem_url, dem_zoom)?;
            let engine = PathEngine::new(Arc::new(tiles));
            engine
                .move_location_marker(Position::new(location.y(), location.x(), 0.0), false)
                .await?;
            for LatLon(point) in waypoints {
                engine.add_waypoint(point).await?;
            }
            print_json(&engine.snapshot())?;
        }
    };
    Ok(())
}

fn resolver(
    transport: Arc<dyn Transport>,
    store: Arc<FileStore>,
    overpass_url: String,
) -> Result<CourseResolver, AnyError> {
    let cache = FeatureCache::open(store, CACHE_VERSION)?;
    let geo = Overpass::with_url(transport, overpass_url);
    Ok(CourseResolver::new(Arc::new(geo), cache))
}

fn tiles(
    transport: Arc<dyn Transport>,
    dem: Dem,
    dem_url: Option<String>,
    dem_zoom: Option<u8>,
) -> Result<Tiles, AnyError> {
    let source = match (dem, dem_url) {
        (_, Some(url)) => TileSource::new(url, dem.into()),
        (Dem::Terrarium, None) => TileSource::terrarium(),
        (_, None) => return Err(anyhow!("--dem-url is required for {dem:?} tiles")),
    };
    let source = match dem_zoom {
        Some(zoom) => source.zoom(zoom),
        None => source,
    };
    Ok(Tiles::new(source, SharedFetch::new(transport)))
}

/// A `span` degree square centered on `center`.
fn around(LatLon(center): LatLon, span: f64) -> Rect {
    let half = span / 2.0;
    Rect::new(
        coord!(x: center.x() - half, y: center.y() - half),
        coord!(x: center.x() + half, y: center.y() + half),
    )
}

#[derive(Serialize)]
struct HoleSummary {
    number: u32,
    par: Option<u32>,
    bearing: Option<f64>,
    tee: Option<[f64; 2]>,
    features: Vec<Category>,
}

fn course_summary(course: &LoadedCourse, strokes: &[u32]) -> serde_json::Value {
    let holes: Vec<HoleSummary> = course
        .holes
        .iter()
        .map(|(&number, info)| HoleSummary {
            number,
            par: info.par(),
            bearing: info.bearing(),
            tee: info
                .centerline()
                .and_then(|line| line.points().next())
                .map(|tee: Point| [tee.y(), tee.x()]),
            features: info.features.iter().map(|f| f.category).collect(),
        })
        .collect();

    let mut card = Scorecard::new();
    for (hole, &count) in (1..).zip(strokes) {
        card.set(hole, count);
    }
    let tally = |t: course::Tally| json!({ "strokes": t.strokes, "to_par": t.to_par_label() });

    json!({
        "id": course.id,
        "name": course.name,
        "holes": holes,
        "score": {
            "out": tally(card.out(course)),
            "in": tally(card.inn(course)),
            "total": tally(card.total(course)),
        },
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AnyError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
