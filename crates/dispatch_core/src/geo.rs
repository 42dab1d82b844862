//! Geographic coordinates and great-circle distance, LRU-cached.
//!
//! Grounded on `sim_core::spatial`'s cached Haversine helper, reshaped from
//! H3 `CellIndex` keys (`sim_core`'s grid is H3-indexed; this engine's
//! geography is raw geocoded points with no grid to index) to plain
//! `Coordinate` keys, and computed with the `geo` crate's own Haversine
//! rather than a hand-rolled formula.

use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use geo::{HaversineDistance, Point};
use lru::LruCache;
use serde::{Deserialize, Serialize};

/// A `(lon, lat)` geographic coordinate. Field order matches the `(lon,
/// lat)` convention the Route Provider contract uses throughout (spec.md
/// §4.9), not the more common `(lat, lon)` reading order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Stable ordering key for use as half of a symmetric cache key.
    fn bits_key(self) -> (u64, u64) {
        (self.lon.to_bits(), self.lat.to_bits())
    }
}

fn distance_km_uncached(a: Coordinate, b: Coordinate) -> f64 {
    a.to_point().haversine_distance(&b.to_point()) / 1000.0
}

type CacheKey = ((u64, u64), (u64, u64));

fn get_distance_cache() -> &'static Mutex<LruCache<CacheKey, f64>> {
    static CACHE: OnceLock<Mutex<LruCache<CacheKey, f64>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(10_000).expect("cache size must be non-zero"),
        ))
    })
}

/// Great-circle distance in kilometres between two coordinates, memoised
/// in a process-wide LRU cache keyed symmetrically so `(a, b)` and `(b,
/// a)` share an entry.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (a_key, b_key) = (a.bits_key(), b.bits_key());
    let key: CacheKey = if a_key <= b_key {
        (a_key, b_key)
    } else {
        (b_key, a_key)
    };

    let mut cache = get_distance_cache().lock().unwrap();
    *cache.get_or_insert(key, || distance_km_uncached(a, b))
}
