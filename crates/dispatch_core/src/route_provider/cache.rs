//! LRU-caching decorator over any [`RouteProvider`], mirroring the
//! teacher's `CachedRouteProvider` verbatim in structure (cache key,
//! wrap-any-inner-provider shape), generalised from `(CellIndex,
//! CellIndex)` keys to `(Coordinate, Coordinate)` keys. Directions calls
//! are not cached (each cluster's coordinate list is effectively unique);
//! only the geocoding and distance-matrix calls repeat across a run.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use lru::LruCache;

use crate::config::Metric;
use crate::error::Result;
use crate::geo::Coordinate;

use super::{DirectionsResponse, DistanceMatrix, RouteProvider};

pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    geocode_cache: Mutex<LruCache<String, Coordinate>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize) -> Self {
        Self {
            inner,
            geocode_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be > 0"),
            )),
        }
    }

    fn geocode_key(address: &str, postal_code: &str, city: &str, country: &str) -> String {
        format!("{address}|{postal_code}|{city}|{country}")
    }
}

#[async_trait]
impl RouteProvider for CachedRouteProvider {
    async fn get_coordinates(
        &self,
        address: &str,
        postal_code: &str,
        city: &str,
        country: &str,
    ) -> Result<Coordinate> {
        let key = Self::geocode_key(address, postal_code, city, country);
        if let Some(cached) = self.geocode_cache.lock().unwrap().get(&key) {
            return Ok(*cached);
        }
        let coordinate = self
            .inner
            .get_coordinates(address, postal_code, city, country)
            .await?;
        self.geocode_cache.lock().unwrap().put(key, coordinate);
        Ok(coordinate)
    }

    async fn compute_distance_matrix(&self, coords: &[Coordinate]) -> Result<DistanceMatrix> {
        // Each bucket's coordinate list is effectively unique per run, so
        // the matrix call is not cached — only geocoding repeats.
        self.inner.compute_distance_matrix(coords).await
    }

    async fn get_directions(&self, coords: &[Coordinate]) -> Result<DirectionsResponse> {
        self.inner.get_directions(coords).await
    }

    fn metric(&self) -> Metric {
        self.inner.metric()
    }
}
