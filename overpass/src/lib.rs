//! # Overpass
//!
//! Runs [Overpass QL](https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL)
//! filters against an Overpass interpreter and returns the matching
//! OpenStreetMap elements as [`Feature`]s.

mod decode;
mod error;
mod feature;
pub mod query;

pub use crate::{
    decode::decode,
    error::QueryError,
    feature::{osm_id, Feature, Tags},
};
pub use geo;

use async_trait::async_trait;
use log::debug;
use netcache::Transport;
use std::sync::Arc;

pub const DEFAULT_URL: &str = "https://overpass-api.de/api/interpreter";

/// A remote source of geographic features.
#[async_trait]
pub trait GeoQuery: Send + Sync {
    /// Returns every feature matched by `filter`.
    ///
    /// `filter` is passed through unvalidated.
    async fn query(&self, filter: &str) -> Result<Vec<Feature>, QueryError>;
}

#[derive(Clone)]
pub struct Overpass {
    url: String,
    transport: Arc<dyn Transport>,
}

impl Overpass {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_url(transport, DEFAULT_URL)
    }

    pub fn with_url(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GeoQuery for Overpass {
    async fn query(&self, filter: &str) -> Result<Vec<Feature>, QueryError> {
        let body = query::wrap(filter);
        let raw = self.transport.post(&self.url, body).await?;
        let features = decode(&raw)?;
        debug!("{} features from {} byte response", features.len(), raw.len());
        Ok(features)
    }
}
