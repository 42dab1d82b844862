use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

pub type DriverId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    Delivering,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub user_id: i64,
    pub full_name: String,
    pub is_active: bool,
    pub status: DriverStatus,
    pub coordinate: Option<Coordinate>,
    /// Opaque payload describing the driver's current route, if any;
    /// never interpreted by the engine.
    pub current_route: Option<serde_json::Value>,
    pub estimated_finish_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// §3 invariant: dispatchable iff available, or delivering with a
    /// finish time within `eta_threshold` of `now`, and both coordinates
    /// known. Drivers model a single coordinate (no separate lon/lat
    /// columns), so "both coordinates known" reduces to `coordinate.is_some()`.
    pub fn is_dispatchable(&self, now: DateTime<Utc>, eta_threshold: chrono::Duration) -> bool {
        if self.coordinate.is_none() {
            return false;
        }
        match self.status {
            DriverStatus::Available => true,
            DriverStatus::Delivering => self
                .estimated_finish_time
                .map(|finish| finish <= now + eta_threshold)
                .unwrap_or(false),
            DriverStatus::Offline => false,
        }
    }
}
