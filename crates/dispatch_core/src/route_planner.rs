//! Route Planner (S4). Grounded on
//! `orders_optimizer.py::compute_cluster_route` and
//! `open_route_service.py::format_direction_response`'s `visited_to_coord`
//! index: the depot bookends the coordinate list, the provider reorders
//! interior stops, and the response's visited order is mapped back to the
//! original order list to recover segment start/end addresses.

use crate::error::Result;
use crate::geo::Coordinate;
use crate::models::order::DeliveryAddress;
use crate::models::{ClusterRoute, DeliveryStep, Order, RouteSegment};
use crate::route_provider::RouteProvider;

/// A fixed depot location, bookending every cluster's coordinate list.
#[derive(Debug, Clone)]
pub struct Depot {
    pub coordinate: Coordinate,
    pub address: DeliveryAddress,
}

/// Builds a `ClusterRoute` for the given orders, per spec.md §4.4.
/// `orders` is mutated in place to the post-optimisation visiting order so
/// that `Cluster::orders` ends up route-ordered, matching §3's "member
/// orders (ordered — the visiting order defined by the optimised route)".
pub async fn compute_cluster_route(
    orders: &mut Vec<Order>,
    depot: &Depot,
    provider: &dyn RouteProvider,
) -> Result<ClusterRoute> {
    if orders.is_empty() {
        return Ok(ClusterRoute {
            id: short_id(),
            total_distance_meters: 0.0,
            total_duration_secs: 0.0,
            segments: vec![RouteSegment {
                distance_meters: 0.0,
                duration_secs: 0.0,
                duration_from_start_secs: 0.0,
                start_address: depot.address.clone(),
                end_address: depot.address.clone(),
                terminal_address: depot.address.clone(),
                steps: Vec::new(),
            }],
        });
    }

    let mut coords = Vec::with_capacity(orders.len() + 2);
    coords.push(depot.coordinate);
    coords.extend(orders.iter().map(|o| o.coordinate));
    coords.push(depot.coordinate);

    let response = provider.get_directions(&coords).await?;

    // `visited_to_coord`: for each interior visited coordinate, its
    // position in the *original* input list (depot bookends excluded).
    // Ties (coincident coordinates) resolve to the first unmatched
    // original order, preserving input order — matching the stable
    // tie-break spec.md requires of this stage's sibling clustering step.
    let mut claimed = vec![false; orders.len()];
    let visited_interior = &response.visited_order[1..response.visited_order.len().saturating_sub(1)];
    let mut visited_to_order_idx = Vec::with_capacity(visited_interior.len());
    for visited in visited_interior {
        let mut matched = None;
        for (idx, order) in orders.iter().enumerate() {
            if claimed[idx] {
                continue;
            }
            if coordinates_match(order.coordinate, *visited) {
                matched = Some(idx);
                break;
            }
        }
        let idx = matched.unwrap_or(0);
        claimed[idx] = true;
        visited_to_order_idx.push(idx);
    }

    // Reorder `orders` to match the route's visiting order.
    let reordered: Vec<Order> = visited_to_order_idx
        .iter()
        .map(|&idx| orders[idx].clone())
        .collect();
    *orders = reordered;

    let mut segments = Vec::with_capacity(response.segments.len());
    let mut running_duration = 0.0;
    for (i, segment) in response.segments.into_iter().enumerate() {
        let start_address = if i == 0 {
            depot.address.clone()
        } else {
            orders[i - 1].delivery_address.clone()
        };
        let end_address = if i + 1 == orders.len() + 1 {
            depot.address.clone()
        } else {
            orders[i].delivery_address.clone()
        };
        let terminal_address = end_address.clone();

        let mut step_running_duration = running_duration;
        let steps = segment
            .steps
            .into_iter()
            .map(|step| {
                step_running_duration += step.duration_secs;
                DeliveryStep {
                    road_name: step.road_name,
                    step_type: step.step_type,
                    distance_meters: step.distance_meters,
                    duration_secs: step.duration_secs,
                    duration_from_start_secs: step_running_duration,
                    instruction: step.instruction,
                    waypoint_indices: step.waypoint_indices,
                }
            })
            .collect();

        running_duration += segment.duration_secs;

        segments.push(RouteSegment {
            distance_meters: segment.distance_meters,
            duration_secs: segment.duration_secs,
            duration_from_start_secs: running_duration,
            start_address,
            end_address,
            terminal_address,
            steps,
        });
    }

    Ok(ClusterRoute {
        id: short_id(),
        total_distance_meters: response.summary.distance_meters,
        total_duration_secs: response.summary.duration_secs,
        segments,
    })
}

fn coordinates_match(a: Coordinate, b: Coordinate) -> bool {
    (a.lon - b.lon).abs() < 1e-9 && (a.lat - b.lat).abs() < 1e-9
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_provider::InMemoryRouteProvider;
    use crate::test_support::fixtures::{depot_at, order_at};
    use chrono::Utc;

    #[tokio::test]
    async fn route_has_n_plus_one_segments() {
        let provider = InMemoryRouteProvider::default();
        let depot = depot_at(Coordinate::new(9.19, 45.4642));
        let now = Utc::now();
        let mut orders = vec![
            order_at(1, Coordinate::new(9.20, 45.47), now),
            order_at(2, Coordinate::new(9.21, 45.48), now),
            order_at(3, Coordinate::new(9.22, 45.49), now),
        ];

        let route = compute_cluster_route(&mut orders, &depot, &provider)
            .await
            .unwrap();

        assert_eq!(route.segments.len(), orders.len() + 1);
        assert_eq!(route.order_count(), orders.len());

        let mut last = 0.0;
        for segment in &route.segments {
            assert!(segment.duration_from_start_secs >= last);
            last = segment.duration_from_start_secs;
        }
        assert_eq!(route.segments.first().unwrap().start_address, depot.address);
        assert_eq!(route.segments.last().unwrap().end_address, depot.address);
    }

    #[tokio::test]
    async fn degenerate_coincident_coordinates_yield_zero_cost_segments() {
        let provider = InMemoryRouteProvider::default();
        let point = Coordinate::new(9.19, 45.4642);
        let depot = depot_at(point);
        let now = Utc::now();
        let mut orders = vec![order_at(1, point, now), order_at(2, point, now)];

        let route = compute_cluster_route(&mut orders, &depot, &provider)
            .await
            .unwrap();
        assert_eq!(route.total_distance_meters, 0.0);
        assert_eq!(route.total_duration_secs, 0.0);
    }
}
