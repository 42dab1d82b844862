use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::{Order, OrderId};
use super::route::ClusterRoute;
use crate::matching::profile::AssignmentProfile;

pub type ClusterId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    ToBeAssigned,
    Assigned,
    Delivered,
    Cancelled,
}

/// A capacity-bounded, geographically-coherent subset of one time bucket.
/// Member orders are stored in route-visiting order once `cluster_route`
/// is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub time_window: DateTime<Utc>,
    pub orders: Vec<Order>,
    pub total_items: usize,
    pub earliest_delivery_time: DateTime<Utc>,
    pub cluster_route: Option<ClusterRoute>,
    pub cluster_status: ClusterStatus,
    pub relaxed_constraints: Option<AssignmentProfile>,
}

impl Cluster {
    /// Builds a cluster from its member orders, deriving `total_items` and
    /// `earliest_delivery_time` per §3 and generating a fresh short id the
    /// way `app/schemas/cluster.py::ClusterRoute` defaults its own id via
    /// `secrets.token_hex(2)`.
    pub fn new(time_window: DateTime<Utc>, orders: Vec<Order>) -> Self {
        let total_items: usize = orders.iter().map(Order::food_count).sum();
        let earliest_delivery_time = orders
            .iter()
            .map(|o| o.desired_delivery_time)
            .min()
            .unwrap_or(time_window);

        Self {
            id: short_id(),
            time_window,
            orders,
            total_items,
            earliest_delivery_time,
            cluster_route: None,
            cluster_status: ClusterStatus::ToBeAssigned,
            relaxed_constraints: None,
        }
    }

    /// `[SUPPLEMENT]` the original `OrderCluster.get_order_ids` accessor,
    /// standardised as a method per §9's resolution of the source's
    /// property-vs-callable inconsistency.
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|o| o.id).collect()
    }

    /// `[SUPPLEMENT]` the original `OrderCluster.customer_locations`
    /// accessor.
    pub fn customer_locations(&self) -> Vec<crate::geo::Coordinate> {
        self.orders.iter().map(|o| o.coordinate).collect()
    }
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
