//! Live yardage: the path from the golfer's location through
//! user-placed waypoints, measured leg by leg with elevation.

mod engine;
mod error;
mod location;
mod segment;
mod viewport;

pub use crate::{
    engine::{PathEngine, PathUpdate, WaypointId},
    error::{PathError, PositionUnavailable},
    location::{FixedPosition, LocationFeed, Locator, Position, PositionSource},
    segment::Segment,
    viewport::{Viewport, LOCATION_RADIUS_M},
};
pub use geo;
