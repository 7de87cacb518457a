//! In-flight request sharing.

use crate::{FetchError, Transport};
use dashmap::DashMap;
use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use log::debug;
use std::sync::Arc;

type SharedBytes = Shared<BoxFuture<'static, Result<Arc<[u8]>, FetchError>>>;

/// Deduplicates concurrent GET requests for the same URL.
///
/// The first caller starts the request and every caller asking for
/// the same URL while an entry exists awaits that same request. An
/// entry stays until its owner calls [`SharedFetch::evict`], normally
/// right after the response has been cached elsewhere. Failed
/// requests evict themselves.
#[derive(Clone)]
pub struct SharedFetch {
    transport: Arc<dyn Transport>,
    in_flight: Arc<DashMap<String, SharedBytes>>,
}

impl SharedFetch {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    pub async fn get(&self, url: &str) -> Result<Arc<[u8]>, FetchError> {
        // Clone the future out so the map shard isn't locked across
        // the await.
        let request = self
            .in_flight
            .entry(url.to_owned())
            .or_insert_with(|| {
                debug!("fetching {url}");
                let transport = Arc::clone(&self.transport);
                let url = url.to_owned();
                async move { transport.get(&url).await.map(Arc::<[u8]>::from) }
                    .boxed()
                    .shared()
            })
            .clone();
        let result = request.await;
        if result.is_err() {
            self.evict(url);
        }
        result
    }

    /// Forgets the request for `url` so the next `get` goes back to
    /// the network.
    pub fn evict(&self, url: &str) {
        self.in_flight.remove(url);
    }

    /// Returns the number of requests currently shared.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::SharedFetch;
    use crate::{FetchError, Transport};
    use async_trait::async_trait;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    #[derive(Default)]
    struct Counting {
        gets: AtomicUsize,
    }

    #[async_trait]
    impl Transport for Counting {
        async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if url.ends_with("missing") {
                Err(FetchError::Status {
                    url: url.to_owned(),
                    status: 404,
                })
            } else {
                Ok(url.as_bytes().to_vec())
            }
        }

        async fn post(&self, _url: &str, _body: String) -> Result<Vec<u8>, FetchError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_request() {
        let transport = Arc::new(Counting::default());
        let fetch = SharedFetch::new(transport.clone());
        let (a, b) = tokio::join!(fetch.get("tile/1"), fetch.get("tile/1"));
        assert_eq!(&*a.unwrap(), b"tile/1");
        assert_eq!(&*b.unwrap(), b"tile/1");
        assert_eq!(transport.gets.load(Ordering::SeqCst), 1);
        assert_eq!(fetch.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_evict_forces_refetch() {
        let transport = Arc::new(Counting::default());
        let fetch = SharedFetch::new(transport.clone());
        fetch.get("tile/1").await.unwrap();
        fetch.get("tile/1").await.unwrap();
        assert_eq!(transport.gets.load(Ordering::SeqCst), 1);
        fetch.evict("tile/1");
        assert_eq!(fetch.in_flight(), 0);
        fetch.get("tile/1").await.unwrap();
        assert_eq!(transport.gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_retained() {
        let transport = Arc::new(Counting::default());
        let fetch = SharedFetch::new(transport.clone());
        assert!(matches!(
            fetch.get("tile/missing").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetch.in_flight(), 0);
        assert!(fetch.get("tile/missing").await.is_err());
        assert_eq!(transport.gets.load(Ordering::SeqCst), 2);
    }
}
