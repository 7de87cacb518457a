use crate::{PathError, Position, Segment, Viewport};
use futures::future::try_join_all;
use geo::geometry::Point;
use log::{debug, warn};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use terrain::ElevationSource;
use tokio::sync::watch;

/// Stable handle to a waypoint for the lifetime of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WaypointId(pub u64);

/// A computed path, as published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathUpdate {
    /// The location (when included) followed by the waypoints.
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
    pub generation: u64,
}

#[derive(Default)]
struct PathState {
    location: Option<Point>,
    waypoints: Vec<(WaypointId, Point)>,
    next_id: u64,
    viewport: Option<Viewport>,
    line: PathUpdate,
}

impl PathState {
    fn points(&self) -> Vec<Point> {
        let location = self.location.filter(|&location| {
            self.viewport
                .map_or(true, |view| view.includes_location(location))
        });
        location
            .into_iter()
            .chain(self.waypoints.iter().map(|&(_, point)| point))
            .collect()
    }

    fn waypoint_mut(&mut self, id: WaypointId) -> Option<&mut Point> {
        self.waypoints
            .iter_mut()
            .find(|(wid, _)| *wid == id)
            .map(|(_, point)| point)
    }
}

/// Measures the path from the golfer's location through any number of
/// waypoints.
///
/// Every mutation recomputes the whole line. Recomputations race
/// freely; only the one started last is applied.
pub struct PathEngine {
    elevation: Arc<dyn ElevationSource>,
    state: Mutex<PathState>,
    generation: AtomicU64,
    updates: watch::Sender<PathUpdate>,
}

impl PathEngine {
    pub fn new(elevation: Arc<dyn ElevationSource>) -> Self {
        let (updates, _) = watch::channel(PathUpdate::default());
        Self {
            elevation,
            state: Mutex::new(PathState::default()),
            generation: AtomicU64::new(0),
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PathState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops all waypoints and invalidates any recomputation in
    /// flight. The path shrinks to the location marker, if it's
    /// included, or nothing before the first fix.
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.waypoints.clear();
        state.line = PathUpdate {
            points: state.points(),
            segments: Vec::new(),
            generation,
        };
        self.updates.send_replace(state.line.clone());
    }

    pub async fn add_waypoint(&self, point: Point) -> Result<WaypointId, PathError> {
        let id = {
            let mut state = self.lock();
            let id = WaypointId(state.next_id);
            state.next_id += 1;
            state.waypoints.push((id, point));
            id
        };
        self.update_line().await?;
        Ok(id)
    }

    /// Returns false if there's no waypoint `id`.
    pub async fn remove_waypoint(&self, id: WaypointId) -> Result<bool, PathError> {
        let removed = {
            let mut state = self.lock();
            let before = state.waypoints.len();
            state.waypoints.retain(|(wid, _)| *wid != id);
            state.waypoints.len() != before
        };
        if removed {
            self.update_line().await?;
        }
        Ok(removed)
    }

    /// Returns false if there's no waypoint `id`.
    pub async fn move_waypoint(&self, id: WaypointId, point: Point) -> Result<bool, PathError> {
        let moved = match self.lock().waypoint_mut(id) {
            Some(waypoint) => {
                *waypoint = point;
                true
            }
            None => false,
        };
        if moved {
            self.update_line().await?;
        }
        Ok(moved)
    }

    pub async fn move_location_marker(
        &self,
        position: Position,
        recenter: bool,
    ) -> Result<(), PathError> {
        {
            let mut state = self.lock();
            let point = position.point();
            state.location = Some(point);
            if recenter {
                if let Some(view) = state.viewport.as_mut() {
                    view.recenter(point);
                }
            }
        }
        self.update_line().await?;
        Ok(())
    }

    /// Sets the visible area, which decides whether the location
    /// starts the path. Doesn't recompute.
    pub fn set_viewport(&self, viewport: Option<Viewport>) {
        self.lock().viewport = viewport;
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.lock().viewport
    }

    /// Recomputes every segment from scratch.
    ///
    /// Returns `Ok(None)` when a newer recomputation or a reset started
    /// while this one was waiting on elevations.
    pub async fn update_line(&self) -> Result<Option<PathUpdate>, PathError> {
        let (generation, points) = {
            let state = self.lock();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (generation, state.points())
        };

        let elevations = if points.len() < 2 {
            Vec::new()
        } else {
            try_join_all(points.iter().map(|point| self.elevation.elevation(point.0))).await?
        };
        let segments = points
            .windows(2)
            .zip(elevations.windows(2))
            .map(|(ends, heights)| Segment::new(ends[0], ends[1], heights[0], heights[1]))
            .collect();

        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding stale path, generation {generation}");
            return Ok(None);
        }
        state.line = PathUpdate {
            points,
            segments,
            generation,
        };
        self.updates.send_replace(state.line.clone());
        Ok(Some(state.line.clone()))
    }

    /// The most recently applied path.
    pub fn snapshot(&self) -> PathUpdate {
        self.lock().line.clone()
    }

    pub fn waypoints(&self) -> Vec<(WaypointId, Point)> {
        self.lock().waypoints.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PathUpdate> {
        self.updates.subscribe()
    }

    /// Moves the location marker on every fix from `feed` until its
    /// sender goes away.
    pub async fn follow(&self, mut feed: watch::Receiver<Option<Position>>) {
        loop {
            let latest = *feed.borrow_and_update();
            if let Some(position) = latest {
                if let Err(e) = self.move_location_marker(position, false).await {
                    warn!("location update: {e}");
                }
            }
            if feed.changed().await.is_err() {
                break;
            }
        }
    }
}
