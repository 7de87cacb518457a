//! Grouping course features by hole.

use crate::{Category, CourseFeature, CourseId};
use geo::{
    geometry::{Geometry, LineString, Point},
    Centroid,
};
use log::debug;
use overpass::Feature;
use serde::Serialize;
use std::collections::BTreeMap;
use terrain::math::{bearing, point_to_line_distance};

/// Features farther than this from every hole centerline aren't
/// attributed to any hole.
pub const HOLE_CUTOFF_M: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoleInfo {
    /// The hole's centerline, tee to green.
    pub hole: Feature,

    /// Tees, fairways, bunkers and greens closest to this hole.
    pub features: Vec<CourseFeature>,
}

impl HoleInfo {
    pub fn centerline(&self) -> Option<&LineString> {
        centerline(&self.hole)
    }

    pub fn par(&self) -> Option<u32> {
        self.hole.tag("par").and_then(|par| par.trim().parse().ok())
    }

    /// Bearing in degrees from the first to the last centerline
    /// vertex.
    pub fn bearing(&self) -> Option<f64> {
        let line = self.centerline()?;
        let (first, last) = (line.0.first()?, line.0.last()?);
        Some(bearing(Point(*first), Point(*last)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedCourse {
    pub id: CourseId,
    pub name: String,
    pub holes: BTreeMap<u32, HoleInfo>,
}

impl LoadedCourse {
    pub fn hole(&self, number: u32) -> Option<&HoleInfo> {
        self.holes.get(&number)
    }

    pub fn par(&self, number: u32) -> Option<u32> {
        self.hole(number).and_then(HoleInfo::par)
    }
}

/// Returns the hole number in a centerline's `ref`, if it's a positive
/// integer.
fn hole_number(feature: &Feature) -> Option<u32> {
    feature
        .tag("ref")
        .and_then(|r| r.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

fn centerline(feature: &Feature) -> Option<&LineString> {
    match &feature.geometry {
        Geometry::LineString(line) => Some(line),
        Geometry::Polygon(poly) => Some(poly.exterior()),
        _ => None,
    }
}

/// Builds one [`HoleInfo`] per numbered hole centerline and assigns
/// every other feature to the hole whose centerline passes closest to
/// the feature's centroid.
///
/// A later centerline with the same number replaces an earlier one.
/// Features [`HOLE_CUTOFF_M`] or more from every centerline are
/// dropped. Ties go to the lowest hole number.
pub fn partition(features: &[CourseFeature]) -> BTreeMap<u32, HoleInfo> {
    let mut holes = BTreeMap::new();
    for cf in features.iter().filter(|cf| cf.category == Category::Hole) {
        match (hole_number(&cf.feature), centerline(&cf.feature)) {
            (Some(number), Some(_)) => {
                holes.insert(
                    number,
                    HoleInfo {
                        hole: cf.feature.clone(),
                        features: Vec::new(),
                    },
                );
            }
            _ => debug!("ignoring unnumbered hole {}", cf.feature.id),
        }
    }

    for cf in features.iter().filter(|cf| cf.category != Category::Hole) {
        let Some(centroid) = cf.feature.geometry.centroid() else {
            continue;
        };
        let mut closest: Option<(u32, f64)> = None;
        for (&number, info) in &holes {
            let Some(line) = info.centerline() else {
                continue;
            };
            let distance = point_to_line_distance(centroid, line);
            if distance < closest.map_or(HOLE_CUTOFF_M, |(_, d)| d) {
                closest = Some((number, distance));
            }
        }
        match closest.and_then(|(number, _)| holes.get_mut(&number)) {
            Some(info) => info.features.push(cf.clone()),
            None => debug!("{} is not near any hole", cf.feature.id),
        }
    }

    holes
}
