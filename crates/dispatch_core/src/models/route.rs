use serde::{Deserialize, Serialize};

use super::order::DeliveryAddress;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStep {
    pub road_name: String,
    pub step_type: i32,
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub duration_from_start_secs: f64,
    pub instruction: String,
    pub waypoint_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub duration_from_start_secs: f64,
    pub start_address: DeliveryAddress,
    pub end_address: DeliveryAddress,
    /// The delivery this segment terminates at; equals `end_address`
    /// except for the final depot-returning segment.
    pub terminal_address: DeliveryAddress,
    pub steps: Vec<DeliveryStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRoute {
    pub id: String,
    pub total_distance_meters: f64,
    pub total_duration_secs: f64,
    pub segments: Vec<RouteSegment>,
}

impl ClusterRoute {
    /// §8 invariant 3: a cluster of N orders has exactly N+1 segments.
    pub fn order_count(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}
