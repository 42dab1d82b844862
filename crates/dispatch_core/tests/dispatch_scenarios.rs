//! End-to-end dispatch batch scenarios, run against `InMemoryStore` and
//! `InMemoryRouteProvider` the way `sim_core`'s own integration suite
//! drives `simulation_schedule()` end to end rather than unit-testing each
//! stage in isolation.

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dispatch_core::config::AssignmentConfig;
use dispatch_core::dispatcher::run_dispatch_at;
use dispatch_core::error::{DeferralReason, DispatchError, Result as DispatchResult};
use dispatch_core::geo::Coordinate;
use dispatch_core::models::{DriverStatus, OrderStatus};
use dispatch_core::persistence::in_memory::InMemoryStore;
use dispatch_core::route_provider::{DirectionsResponse, DistanceMatrix, InMemoryRouteProvider, RouteProvider};

use support::{base_config, driver, order};

/// Happy path: a handful of nearby orders in one time bucket, one
/// available driver. Everything clusters, routes, and assigns in the
/// strict pass.
#[tokio::test]
async fn e1_happy_path_assigns_the_sole_cluster_to_the_sole_driver() {
    let config = base_config();
    let store = InMemoryStore::new();
    let provider = InMemoryRouteProvider::default();
    let now = Utc::now();

    for i in 1..=3 {
        store
            .seed_order(order(i, Coordinate::new(0.001 * i as f64, 0.001 * i as f64), now + Duration::hours(1), 1))
            .await;
    }
    store.seed_driver(driver(1, Coordinate::new(0.0, 0.0))).await;

    let outcome = run_dispatch_at(&config, &store, &provider, None, now, None).await.unwrap();

    assert_eq!(outcome.assignments.len(), 1);
    assert!(outcome.deferrals.is_empty());

    let clusters = store.all_clusters().await;
    assert_eq!(clusters.len(), 1);
    let route = clusters[0].cluster_route.as_ref().unwrap();
    assert_eq!(route.segments.len(), clusters[0].orders.len() + 1);

    for i in 1..=3 {
        assert_eq!(store.get_order(i).await.unwrap().status, OrderStatus::Assigned);
    }
    assert_eq!(store.get_driver(1).await.unwrap().status, DriverStatus::Delivering);
}

/// Capacity split: a dozen co-located orders whose combined pizza count
/// exceeds `max_pizzas_per_cluster`, forcing the geo clusterer to cut the
/// single geographic group into more than one cluster.
#[tokio::test]
async fn e2_capacity_split_produces_more_than_one_cluster() {
    let mut config = base_config();
    config.clustering.max_pizzas_per_cluster = 10;
    let store = InMemoryStore::new();
    let provider = InMemoryRouteProvider::default();
    let now = Utc::now();

    // 12 orders, all at the same point so clustering never splits on
    // distance, summing to 14 pizzas: one cluster's worth of capacity plus
    // a remainder that must land in a second cluster.
    let point = Coordinate::new(0.0005, 0.0005);
    let mut total_food = 0usize;
    for i in 1..=12 {
        let food_count = if i <= 2 { 2 } else { 1 };
        total_food += food_count;
        store.seed_order(order(i, point, now + Duration::hours(1), food_count)).await;
    }
    assert_eq!(total_food, 14);
    store.seed_driver(driver(1, Coordinate::new(0.0, 0.0))).await;

    let outcome = run_dispatch_at(&config, &store, &provider, None, now, None).await.unwrap();
    let clusters = store.all_clusters().await;

    assert_eq!(clusters.len(), 2);
    assert!(clusters.iter().all(|c| c.total_items <= 10));
    assert_eq!(clusters.iter().map(|c| c.total_items).sum::<usize>(), 14);
    // Only one driver for two clusters: one is assigned, one deferred.
    assert_eq!(outcome.assignments.len() + outcome.deferrals.len(), 2);
}

/// Hotness breach resolved by relaxation: a cluster whose route is just
/// far enough that the strict pass's default hotness tolerance rejects
/// it, but the first relaxation round's looser tolerance accepts it.
#[tokio::test]
async fn e3_hotness_breach_is_salvaged_by_relaxation_round_one() {
    let mut config = base_config();
    config.assignment = AssignmentConfig {
        max_hotness_minutes: 20,
        ..AssignmentConfig::default()
    };
    let store = InMemoryStore::new();
    let provider = InMemoryRouteProvider::default();
    let now = Utc::now();

    // Six orders spread along a line; the route's cumulative duration plus
    // per-stop payment delay breaches 20 minutes by the last stop but
    // settles comfortably under 25.
    for i in 1..=6 {
        let lat = 0.0075 * i as f64;
        store.seed_order(order(i, Coordinate::new(0.0, lat), now + Duration::hours(2), 1)).await;
    }
    store.seed_driver(driver(1, Coordinate::new(0.0, 0.0))).await;

    let outcome = run_dispatch_at(&config, &store, &provider, None, now, None).await.unwrap();

    assert_eq!(outcome.assignments.len(), 1);
    assert!(outcome.deferrals.is_empty());
    assert!(outcome.assignments[0]
        .relaxation_log
        .iter()
        .any(|line| line.starts_with("Relaxed hotness tolerance to 25")));
}

/// Fewer drivers than clusters: the cheaper cluster wins the sole driver,
/// the other is deferred rather than left half-served.
#[tokio::test]
async fn e4_fewer_drivers_than_clusters_defers_the_pricier_one() {
    let config = base_config();
    let store = InMemoryStore::new();
    let provider = InMemoryRouteProvider::default();
    let now = Utc::now();

    // Distinct time buckets guarantee two separate clusters regardless of
    // the (generous) distance cutoff.
    store.seed_order(order(1, Coordinate::new(0.001, 0.001), now + Duration::minutes(10), 1)).await;
    store.seed_order(order(2, Coordinate::new(0.05, 0.05), now + Duration::minutes(50), 1)).await;
    store.seed_driver(driver(1, Coordinate::new(0.0, 0.0))).await;

    let outcome = run_dispatch_at(&config, &store, &provider, None, now, None).await.unwrap();

    assert_eq!(outcome.assignments.len(), 1);
    assert_eq!(outcome.deferrals.len(), 1);
    assert_eq!(store.get_driver(1).await.unwrap().status, DriverStatus::Delivering);

    let deferred_order_status = if store.get_order(1).await.unwrap().status == OrderStatus::Assigned {
        store.get_order(2).await.unwrap().status
    } else {
        store.get_order(1).await.unwrap().status
    };
    assert_eq!(deferred_order_status, OrderStatus::Pending);
}

/// A route provider failure during the distance-matrix call aborts the
/// whole run before any commit: every order stays pending.
#[tokio::test]
async fn e5_provider_failure_aborts_before_any_commit() {
    #[derive(Debug)]
    struct Unreachable;

    impl std::fmt::Display for Unreachable {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "provider unreachable")
        }
    }

    impl std::error::Error for Unreachable {}

    struct FailingProvider;

    #[async_trait]
    impl RouteProvider for FailingProvider {
        async fn get_coordinates(
            &self,
            _address: &str,
            _postal_code: &str,
            _city: &str,
            _country: &str,
        ) -> DispatchResult<Coordinate> {
            Ok(Coordinate::new(0.0, 0.0))
        }

        async fn compute_distance_matrix(&self, _coords: &[Coordinate]) -> DispatchResult<DistanceMatrix> {
            Err(DispatchError::route_provider(Unreachable))
        }

        async fn get_directions(&self, _coords: &[Coordinate]) -> DispatchResult<DirectionsResponse> {
            unreachable!("matrix call fails first")
        }

        fn metric(&self) -> dispatch_core::config::Metric {
            dispatch_core::config::Metric::Duration
        }
    }

    let config = base_config();
    let store = InMemoryStore::new();
    let provider = FailingProvider;
    let now = Utc::now();

    store.seed_order(order(1, Coordinate::new(0.001, 0.001), now + Duration::hours(1), 1)).await;
    store.seed_order(order(2, Coordinate::new(0.002, 0.002), now + Duration::hours(1), 1)).await;
    store.seed_driver(driver(1, Coordinate::new(0.0, 0.0))).await;

    let result = run_dispatch_at(&config, &store, &provider, None, now, None).await;

    assert!(result.is_err());
    assert_eq!(store.get_order(1).await.unwrap().status, OrderStatus::Pending);
    assert_eq!(store.get_order(2).await.unwrap().status, OrderStatus::Pending);
    assert!(store.all_clusters().await.is_empty());
    assert_eq!(store.get_driver(1).await.unwrap().status, DriverStatus::Available);
}

/// Unavoidable hotness breach: even after exhausting every relaxation
/// round, the cluster stays infeasible and the driver is left untouched.
#[tokio::test]
async fn e6_unsalvageable_cluster_stays_deferred_after_max_rounds() {
    let mut config = base_config();
    config.assignment = AssignmentConfig {
        max_hotness_minutes: 20,
        max_relaxation_rounds: 3,
        ..AssignmentConfig::default()
    };
    let store = InMemoryStore::new();
    let provider = InMemoryRouteProvider::default();
    let now = Utc::now();

    // Far enough that even round 3's 35-minute tolerance can't absorb it.
    store.seed_order(order(1, Coordinate::new(0.0, 10.0), now + Duration::hours(10), 1)).await;
    store.seed_driver(driver(1, Coordinate::new(0.0, 0.0))).await;

    let outcome = run_dispatch_at(&config, &store, &provider, None, now, None).await.unwrap();

    assert!(outcome.assignments.is_empty());
    assert_eq!(outcome.deferrals.len(), 1);
    assert_eq!(outcome.deferrals[0].reason, DeferralReason::HotnessConstraintNotMet);
    assert_eq!(store.get_driver(1).await.unwrap().status, DriverStatus::Available);
    assert_eq!(store.get_order(1).await.unwrap().status, OrderStatus::Pending);
}
