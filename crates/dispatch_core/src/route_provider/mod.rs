//! Pluggable route providers: trait abstraction for the external
//! geocoding/distance-matrix/directions backend (spec.md §4.9).
//!
//! Grounded on `sim_core::routing`'s shape (trait + `RouteProviderKind` +
//! `build_route_provider` factory + `CachedRouteProvider` LRU decorator),
//! generalised from `sim_core`'s synchronous, H3-cell-keyed contract to an
//! `async_trait` over raw `(lon, lat)` coordinates — this engine's provider
//! calls are genuinely network-bound batch operations (one distance-matrix
//! call per bucket, one directions call per cluster), unlike `sim_core`'s
//! in-process grid lookups.

pub mod http;
pub mod cache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Metric;
use crate::error::{DispatchError, Result};
use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStep {
    pub road_name: String,
    pub step_type: i32,
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub instruction: String,
    pub waypoint_indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSegment {
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub steps: Vec<ProviderStep>,
}

/// `get_directions` response. `visited_order` is `metadata.query.coordinates`
/// in spec.md §4.4/§4.9: the post-optimisation coordinate order, including
/// the depot bookends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub summary: RouteSummary,
    pub segments: Vec<ProviderSegment>,
    pub visited_order: Vec<Coordinate>,
}

/// `compute_distance_matrix` response, keyed by the provider's configured
/// metric (§4.9: "Provider exposes a `metric` attribute").
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    pub durations: Option<Vec<Vec<f64>>>,
    pub distances: Option<Vec<Vec<f64>>>,
}

impl DistanceMatrix {
    /// The matrix for whichever metric the provider is configured to use.
    pub fn for_metric(&self, metric: Metric) -> Option<&Vec<Vec<f64>>> {
        match metric {
            Metric::Duration => self.durations.as_ref(),
            Metric::Distance => self.distances.as_ref(),
        }
    }
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn get_coordinates(
        &self,
        address: &str,
        postal_code: &str,
        city: &str,
        country: &str,
    ) -> Result<Coordinate>;

    async fn compute_distance_matrix(&self, coords: &[Coordinate]) -> Result<DistanceMatrix>;

    async fn get_directions(&self, coords: &[Coordinate]) -> Result<DirectionsResponse>;

    fn metric(&self) -> Metric;
}

/// `[SUPPLEMENT]` a deterministic, non-networked provider used by the test
/// suite and available as `RouteProviderKindConfig::InMemory` — this
/// engine's analogue of `sim_core`'s always-available `H3GridRouteProvider`,
/// re-pointed at plain Haversine geometry instead of an H3 grid.
pub struct InMemoryRouteProvider {
    metric: Metric,
    average_speed_kmh: f64,
}

impl InMemoryRouteProvider {
    pub fn new(metric: Metric, average_speed_kmh: f64) -> Self {
        Self {
            metric,
            average_speed_kmh,
        }
    }
}

impl Default for InMemoryRouteProvider {
    fn default() -> Self {
        Self::new(Metric::Duration, 30.0)
    }
}

#[async_trait]
impl RouteProvider for InMemoryRouteProvider {
    async fn get_coordinates(
        &self,
        _address: &str,
        _postal_code: &str,
        _city: &str,
        _country: &str,
    ) -> Result<Coordinate> {
        Ok(Coordinate::new(0.0, 0.0))
    }

    async fn compute_distance_matrix(&self, coords: &[Coordinate]) -> Result<DistanceMatrix> {
        let n = coords.len();
        let mut distances = vec![vec![0.0; n]; n];
        let mut durations = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let km = crate::geo::distance_km(coords[i], coords[j]);
                let meters = km * 1000.0;
                distances[i][j] = meters;
                durations[i][j] = (km / self.average_speed_kmh) * 3600.0;
            }
        }
        Ok(DistanceMatrix {
            durations: Some(durations),
            distances: Some(distances),
        })
    }

    async fn get_directions(&self, coords: &[Coordinate]) -> Result<DirectionsResponse> {
        if coords.len() < 2 {
            return Err(DispatchError::route_provider(SimpleProviderError(
                "get_directions requires at least two coordinates".to_string(),
            )));
        }

        let mut total_distance = 0.0;
        let mut total_duration = 0.0;
        let mut segments = Vec::with_capacity(coords.len() - 1);
        for pair in coords.windows(2) {
            let km = crate::geo::distance_km(pair[0], pair[1]);
            let distance_meters = km * 1000.0;
            let duration_secs = if km > 0.0 {
                (km / self.average_speed_kmh) * 3600.0
            } else {
                0.0
            };
            total_distance += distance_meters;
            total_duration += duration_secs;
            segments.push(ProviderSegment {
                distance_meters,
                duration_secs,
                steps: vec![ProviderStep {
                    road_name: "unnamed road".to_string(),
                    step_type: 0,
                    distance_meters,
                    duration_secs,
                    instruction: "Head to next stop".to_string(),
                    waypoint_indices: vec![0, 1],
                }],
            });
        }

        Ok(DirectionsResponse {
            summary: RouteSummary {
                distance_meters: total_distance,
                duration_secs: total_duration,
            },
            segments,
            // No real waypoint optimisation: the in-memory provider visits
            // coordinates in the order it was given them.
            visited_order: coords.to_vec(),
        })
    }

    fn metric(&self) -> Metric {
        self.metric
    }
}

#[derive(Debug)]
struct SimpleProviderError(String);

impl std::fmt::Display for SimpleProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleProviderError {}

use std::sync::Arc;

use crate::config::{RouteProviderConfig, RouteProviderKindConfig};

/// Builds a boxed [`RouteProvider`] from configuration, the way
/// `sim_core`'s `build_route_provider` matches on `RouteProviderKind` —
/// re-pointed at this engine's two kinds (`Http`, `InMemory`) instead of
/// `sim_core`'s three (`H3Grid`, `Osrm`, `Precomputed`). `Http` is
/// wrapped in the LRU-caching decorator; `InMemory` is returned bare since
/// it is already an in-process constant-time lookup.
pub fn build_route_provider(config: &RouteProviderConfig) -> Result<Arc<dyn RouteProvider>> {
    match config.kind {
        RouteProviderKindConfig::InMemory => {
            Ok(Arc::new(InMemoryRouteProvider::new(config.metric, 30.0)))
        }
        RouteProviderKindConfig::Http => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                DispatchError::configuration("route_provider.endpoint is required for kind=http")
            })?;
            let inner = http::HttpRouteProvider::new(
                endpoint,
                config.api_key.clone(),
                config.profile.clone().unwrap_or_else(|| "driving-car".to_string()),
                config.metric,
            )?;
            Ok(Arc::new(cache::CachedRouteProvider::new(
                Box::new(inner),
                20_000,
            )))
        }
    }
}
