//! Compute-if-absent JSON cache.

use crate::{CacheError, KvStore};
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};
use std::{future::Future, sync::Arc};

const VERSION_KEY: &str = "appState/version";

#[derive(Clone)]
pub struct FeatureCache {
    store: Arc<dyn KvStore>,
}

impl FeatureCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Returns a cache over `store`, clearing it first if it was
    /// written with a different data `version`.
    pub fn open(store: Arc<dyn KvStore>, version: u32) -> Result<Self, CacheError> {
        let current = version.to_string();
        let stored = store.get(VERSION_KEY)?;
        if stored.as_deref() != Some(current.as_str()) {
            info!("cache version {stored:?} != {current}, clearing");
            store.clear()?;
            store.set(VERSION_KEY, current)?;
        }
        Ok(Self { store })
    }

    /// Returns the value stored under `key`, or runs `compute` and
    /// stores its result.
    ///
    /// `compute` is never invoked on a hit. When it fails, its error
    /// is returned and the store is left untouched.
    pub async fn cache_json<T, E, F, Fut>(&self, key: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(text) = self.store.get(key)? {
            debug!("using cached data for {key}");
            return serde_json::from_str(&text).map_err(|source| {
                CacheError::Corrupt {
                    key: key.to_owned(),
                    source,
                }
                .into()
            });
        }
        debug!("computing {key}");
        let value = compute().await?;
        let text = serde_json::to_string(&value).map_err(CacheError::from)?;
        self.store.set(key, text)?;
        Ok(value)
    }

    pub fn contains(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.store.get(key)?.is_some())
    }

    /// Drops every cached entry.
    pub fn clear(&self) -> Result<(), CacheError> {
        let version = self.store.get(VERSION_KEY)?;
        self.store.clear()?;
        if let Some(version) = version {
            self.store.set(VERSION_KEY, version)?;
        }
        Ok(())
    }
}
