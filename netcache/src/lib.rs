//! Network plumbing shared by the feature and elevation layers: a
//! byte [`Transport`], [`SharedFetch`] for deduplicating concurrent
//! requests, and [`FeatureCache`], a compute-if-absent JSON cache
//! over a [`KvStore`].

mod cache;
mod error;
mod shared;
mod store;
mod transport;

pub use crate::{
    cache::FeatureCache,
    error::{CacheError, FetchError},
    shared::SharedFetch,
    store::{FileStore, KvStore, MemoryStore},
    transport::{HttpTransport, Transport},
};
