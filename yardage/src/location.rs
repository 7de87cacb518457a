//! The live position.

use crate::PositionUnavailable;
use async_trait::async_trait;
use geo::geometry::Point;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,

    /// Radius of uncertainty in meters.
    pub accuracy_m: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

/// On-demand position fixes.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn position(&self) -> Result<Position, PositionUnavailable>;
}

/// A source that always reports the same fix.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Position);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn position(&self) -> Result<Position, PositionUnavailable> {
        Ok(self.0)
    }
}

/// Single-writer feed of position updates.
///
/// Readers see the most recent fix, or `None` before the first one.
pub struct LocationFeed {
    tx: watch::Sender<Option<Position>>,
}

impl LocationFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn publish(&self, position: Position) {
        self.tx.send_replace(Some(position));
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Position>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Option<Position> {
        *self.tx.borrow()
    }
}

impl Default for LocationFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers "where am I" from the feed, falling back to a one-shot
/// query before the first update arrives.
pub struct Locator {
    feed: watch::Receiver<Option<Position>>,
    fallback: Option<Arc<dyn PositionSource>>,
}

impl Locator {
    pub fn new(feed: watch::Receiver<Option<Position>>) -> Self {
        Self {
            feed,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, source: Arc<dyn PositionSource>) -> Self {
        self.fallback = Some(source);
        self
    }

    pub async fn get_pos(&self) -> Result<Position, PositionUnavailable> {
        let latest = *self.feed.borrow();
        match (latest, &self.fallback) {
            (Some(position), _) => Ok(position),
            (None, Some(source)) => source.position().await,
            (None, None) => Err(PositionUnavailable),
        }
    }
}
