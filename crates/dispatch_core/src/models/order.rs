use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

pub type OrderId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Assigned,
    Delivering,
    Delivered,
    Cancelled,
}

/// Structured delivery address, persisted as a JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Item inventory, persisted as a JSON column. `food` drives capacity
/// accounting (§4.3); `drink` is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Items {
    pub food: Vec<String>,
    pub drink: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub creator_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: DeliveryAddress,
    pub coordinate: Coordinate,
    pub items: Items,
    /// Minutes, informational only — the readiness estimator supersedes
    /// this (§9 "Open questions": `estimated_prep_time` is legacy/audit
    /// only, never read by `readiness::estimate_ready_time`).
    pub estimated_prep_time: Option<i64>,
    pub desired_delivery_time: DateTime<Utc>,
    pub priority: bool,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn food_count(&self) -> usize {
        self.items.food.len()
    }
}
