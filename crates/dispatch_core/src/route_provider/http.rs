//! HTTP-backed `RouteProvider` against an OSRM/OpenRouteService-shaped API,
//! grounded on `original_source/app/services/route_planner/open_route_service.py`
//! for the request/response shape (`format_address`, `compute_distance_matrix`,
//! `get_directions`, `format_direction_response`'s `visited_to_coord` index),
//! and on `sim_core::routing::osrm::OsrmRouteProvider` for the client
//! construction style — rebuilt atop non-blocking `reqwest` since this
//! engine's provider calls are awaited, not run from a blocking simulation
//! tick.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Metric;
use crate::error::{DispatchError, Result};
use crate::geo::Coordinate;

use super::{DirectionsResponse, DistanceMatrix, ProviderSegment, ProviderStep, RouteProvider, RouteSummary};

pub struct HttpRouteProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    profile: String,
    metric: Metric,
}

impl HttpRouteProvider {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        profile: String,
        metric: Metric,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(DispatchError::from)?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            profile,
            metric,
        })
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", key.clone()),
            None => builder,
        }
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    features: Vec<GeocodeFeature>,
}

#[derive(Deserialize)]
struct GeocodeFeature {
    geometry: GeocodeGeometry,
}

#[derive(Deserialize)]
struct GeocodeGeometry {
    coordinates: Vec<f64>, // [lon, lat]
}

#[derive(Deserialize)]
struct MatrixResponse {
    durations: Option<Vec<Vec<f64>>>,
    distances: Option<Vec<Vec<f64>>>,
}

#[derive(Deserialize)]
struct DirectionsApiResponse {
    routes: Vec<ApiRoute>,
    metadata: ApiMetadata,
}

#[derive(Deserialize)]
struct ApiMetadata {
    query: ApiQuery,
}

#[derive(Deserialize)]
struct ApiQuery {
    coordinates: Vec<Vec<f64>>, // post-optimisation order, [lon, lat] pairs
}

#[derive(Deserialize)]
struct ApiRoute {
    summary: ApiSummary,
    segments: Vec<ApiSegment>,
}

#[derive(Deserialize, Default)]
struct ApiSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Deserialize)]
struct ApiSegment {
    distance: f64,
    duration: f64,
    steps: Vec<ApiStep>,
}

#[derive(Deserialize)]
struct ApiStep {
    distance: f64,
    duration: f64,
    #[serde(rename = "type")]
    step_type: i32,
    instruction: String,
    name: String,
    way_points: Vec<usize>,
}

#[async_trait]
impl RouteProvider for HttpRouteProvider {
    async fn get_coordinates(
        &self,
        address: &str,
        postal_code: &str,
        city: &str,
        country: &str,
    ) -> Result<Coordinate> {
        let formatted = format!("{address}, {postal_code}, {city}, {country}");
        let request = self.authed(
            self.client
                .get(format!("{}/geocode/search", self.endpoint))
                .query(&[("text", formatted.as_str())]),
        );
        let response: GeocodeResponse = request.send().await?.json().await?;
        let feature = response.features.into_iter().next().ok_or_else(|| {
            DispatchError::route_provider(HttpProviderError(
                "geocoding returned no features".to_string(),
            ))
        })?;
        let coords = feature.geometry.coordinates;
        Ok(Coordinate::new(coords[0], coords[1]))
    }

    async fn compute_distance_matrix(&self, coords: &[Coordinate]) -> Result<DistanceMatrix> {
        let locations: Vec<[f64; 2]> = coords.iter().map(|c| [c.lon, c.lat]).collect();
        let body = serde_json::json!({
            "locations": locations,
            "metrics": ["duration", "distance"],
        });
        let request = self.authed(
            self.client
                .post(format!("{}/v2/matrix/{}", self.endpoint, self.profile))
                .json(&body),
        );
        let response: MatrixResponse = request.send().await?.json().await?;
        Ok(DistanceMatrix {
            durations: response.durations,
            distances: response.distances,
        })
    }

    async fn get_directions(&self, coords: &[Coordinate]) -> Result<DirectionsResponse> {
        let coordinates: Vec<[f64; 2]> = coords.iter().map(|c| [c.lon, c.lat]).collect();
        let body = serde_json::json!({
            "coordinates": coordinates,
            "optimize_waypoints": true,
            "preference": "fastest",
            "format": "json",
        });
        let request = self.authed(
            self.client
                .post(format!("{}/v2/directions/{}/json", self.endpoint, self.profile))
                .json(&body),
        );
        let response: DirectionsApiResponse = request.send().await?.json().await?;
        let route = response.routes.into_iter().next().ok_or_else(|| {
            DispatchError::route_provider(HttpProviderError(
                "directions returned no routes".to_string(),
            ))
        })?;

        let visited_order = response
            .metadata
            .query
            .coordinates
            .into_iter()
            .map(|c| Coordinate::new(c[0], c[1]))
            .collect();

        let segments = route
            .segments
            .into_iter()
            .map(|segment| ProviderSegment {
                distance_meters: segment.distance,
                duration_secs: segment.duration,
                steps: segment
                    .steps
                    .into_iter()
                    .map(|step| ProviderStep {
                        road_name: step.name,
                        step_type: step.step_type,
                        distance_meters: step.distance,
                        duration_secs: step.duration,
                        instruction: step.instruction,
                        waypoint_indices: step.way_points,
                    })
                    .collect(),
            })
            .collect();

        Ok(DirectionsResponse {
            summary: RouteSummary {
                distance_meters: route.summary.distance,
                duration_secs: route.summary.duration,
            },
            segments,
            visited_order,
        })
    }

    fn metric(&self) -> Metric {
        self.metric
    }
}

#[derive(Debug)]
struct HttpProviderError(String);

impl std::fmt::Display for HttpProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for HttpProviderError {}
