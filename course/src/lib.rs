//! # Course
//!
//! Finds golf courses in OpenStreetMap data and resolves a course's
//! raw features (tees, fairways, bunkers, greens and hole centerlines)
//! into per-hole groups.

mod category;
mod error;
mod filter;
mod hole;
mod name;
mod resolver;
mod scorecard;

pub use crate::{
    category::{Category, CourseFeature},
    error::CourseError,
    filter::on_course_features,
    hole::{partition, HoleInfo, LoadedCourse, HOLE_CUTOFF_M},
    name::{marker_label, shorten},
    resolver::{
        discovery_cells, CourseId, CourseMarker, CourseResolver, KnownCourse, AT_COURSE_M,
        DISCOVERY_TILE_DEG, FEATURE_RADIUS_M,
    },
    scorecard::{format_to_par, Scorecard, Tally, HOLES},
};
