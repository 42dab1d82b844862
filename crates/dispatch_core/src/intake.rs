//! Intake & Filter (S1). Grounded on
//! `orders_optimizer.py::{fetch_unassigned_orders, filter_out_unavailable_orders}`:
//! an AND-composed, total, pure filter over an already-fetched order list —
//! fetching itself is the `PersistenceStore`'s job (§6).

use chrono::{DateTime, Utc};

use crate::geo::{distance_km, Coordinate};
use crate::models::Order;

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub geo: Option<GeoFilter>,
}

#[derive(Debug, Clone, Copy)]
pub struct GeoFilter {
    pub origin: Coordinate,
    pub radius_km: f64,
}

/// AND-composes time-window and geographic-radius predicates. The time
/// window bounds `order.created_at`, not `desired_delivery_time` —
/// `orders_optimizer.py::filter_out_unavailable_orders` filters on creation
/// timestamps ("filtering based on creation timestamps"). The geographic
/// predicate only applies when all three of `lat`, `lon`, `radius_km` are
/// present (here: `geo.is_some()`) — otherwise it is disabled, never
/// defaulted to "reject everything" or "accept everything" silently.
pub fn filter_orders(orders: &[Order], filter: &OrderFilter) -> Vec<Order> {
    orders
        .iter()
        .filter(|order| passes(order, filter))
        .cloned()
        .collect()
}

fn passes(order: &Order, filter: &OrderFilter) -> bool {
    if let Some(start) = filter.start_time {
        if order.created_at < start {
            return false;
        }
    }
    if let Some(end) = filter.end_time {
        if order.created_at > end {
            return false;
        }
    }
    if let Some(geo) = filter.geo {
        if distance_km(order.coordinate, geo.origin) > geo.radius_km {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::order_at;
    use chrono::Duration;

    #[test]
    fn geo_filter_disabled_when_absent() {
        let now = Utc::now();
        let orders = vec![order_at(1, Coordinate::new(0.0, 0.0), now)];
        let out = filter_orders(&orders, &OrderFilter::default());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn idempotent_under_repeated_filtering() {
        // §8 invariant 9: filtering twice with the same params equals
        // filtering once.
        let now = Utc::now();
        let orders = vec![
            order_at(1, Coordinate::new(9.19, 45.46), now),
            order_at(2, Coordinate::new(20.0, 50.0), now + Duration::minutes(5)),
        ];
        let filter = OrderFilter {
            start_time: None,
            end_time: None,
            geo: Some(GeoFilter {
                origin: Coordinate::new(9.19, 45.46),
                radius_km: 50.0,
            }),
        };
        let once = filter_orders(&orders, &filter);
        let twice = filter_orders(&once, &filter);
        assert_eq!(once.len(), twice.len());
        assert_eq!(
            once.iter().map(|o| o.id).collect::<Vec<_>>(),
            twice.iter().map(|o| o.id).collect::<Vec<_>>()
        );
    }
}
