//! Dispatcher orchestrator (S1–S6 + collaborators), spec.md §4.8. Expressed
//! as an explicit `DispatchStage` state machine with a linear driving
//! function, the way `sim_core`'s `runner.rs` drives `simulation_schedule()`
//! to completion with an explicit step budget — except this state machine
//! is acyclic (a single batch run, not an event loop): this engine is not a
//! live per-order streaming optimiser.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::geo::Coordinate;
use crate::geo_cluster::cluster_geo;
use crate::intake::{filter_orders, OrderFilter};
use crate::matching::{solve_with_profiles, AssignmentProfile, RelaxationController};
use crate::models::order::DeliveryAddress;
use crate::models::{
    AssignmentOutcome, Cluster, ClusterId, ClusterStatus, Driver, DriverAssignment, DriverId, DriverStatus, OrderId,
    OrderStatus,
};
use crate::persistence::PersistenceStore;
use crate::route_planner::{compute_cluster_route, Depot};
use crate::route_provider::RouteProvider;
use crate::time_bucket::bucket_orders;

/// The dispatcher's state machine, per spec.md §4.8. Not every stage is a
/// distinct match arm in `run_dispatch_at` below (several fold into a
/// single `?`-propagating block), but the sequence is preserved exactly
/// and `Abort`/`Return` are the only terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Intake,
    Filter,
    TimeBucket,
    GeoCluster,
    PersistClusters,
    FetchDrivers,
    StrictAssign,
    Commit1,
    Relax,
    Commit2,
    Return,
    Abort,
}

fn check_cancelled(cancellation: Option<&CancellationToken>) -> Result<()> {
    match cancellation {
        Some(token) if token.is_cancelled() => Err(DispatchError::Cancelled),
        _ => Ok(()),
    }
}

fn depot_from_config(config: &DispatchConfig) -> Depot {
    Depot {
        coordinate: Coordinate::new(config.clustering.depot_lon, config.clustering.depot_lat),
        address: DeliveryAddress {
            address: config.clustering.depot_address.clone(),
            postal_code: config.clustering.depot_postal_code.clone(),
            city: config.clustering.depot_city.clone(),
            country: config.clustering.depot_country.clone(),
        },
    }
}

/// Runs one full dispatch batch against `now = Utc::now()` and no extra
/// order filter. See [`run_dispatch_at`] for the fully parameterised form
/// used by tests.
pub async fn run_dispatch(
    config: &DispatchConfig,
    store: &dyn PersistenceStore,
    provider: &dyn RouteProvider,
    cancellation: Option<&CancellationToken>,
) -> Result<AssignmentOutcome> {
    run_dispatch_at(config, store, provider, cancellation, Utc::now(), None).await
}

/// `INTAKE → FILTER → TIME_BUCKET → GEO_CLUSTER → PERSIST_CLUSTERS →
/// FETCH_DRIVERS → STRICT_ASSIGN → COMMIT₁ → RELAX → COMMIT₂ → RETURN`,
/// per spec.md §4.8. Any Route Provider or Persistence read failure
/// propagates as `DispatchError` before the first `COMMIT` boundary
/// (`ABORT`); cancellation is checked at each stage boundary and honoured
/// cooperatively (the in-flight provider call, if any, always finishes
/// first — §5).
#[instrument(skip(config, store, provider, cancellation))]
pub async fn run_dispatch_at(
    config: &DispatchConfig,
    store: &dyn PersistenceStore,
    provider: &dyn RouteProvider,
    cancellation: Option<&CancellationToken>,
    now: DateTime<Utc>,
    filter: Option<OrderFilter>,
) -> Result<AssignmentOutcome> {
    match run_dispatch_inner(config, store, provider, cancellation, now, filter).await {
        Ok(outcome) => {
            if !outcome.deferrals.is_empty() {
                warn!(deferred = outcome.deferrals.len(), "dispatch run completed with deferrals");
            }
            Ok(outcome)
        }
        Err(err) => {
            tracing::error!(error = %err, "dispatch run aborted");
            Err(err)
        }
    }
}

async fn run_dispatch_inner(
    config: &DispatchConfig,
    store: &dyn PersistenceStore,
    provider: &dyn RouteProvider,
    cancellation: Option<&CancellationToken>,
    now: DateTime<Utc>,
    filter: Option<OrderFilter>,
) -> Result<AssignmentOutcome> {
    // S1: INTAKE + FILTER.
    check_cancelled(cancellation)?;
    let orders = store.fetch_pending_orders().await?;
    let orders = match &filter {
        Some(f) => filter_orders(&orders, f),
        None => orders,
    };
    info!(stage = "intake", count = orders.len(), "fetched and filtered pending orders");

    if orders.is_empty() {
        return Ok(AssignmentOutcome::default());
    }

    // S2: TIME_BUCKET.
    let buckets = bucket_orders(&orders, config.clustering.cluster_time_window_minutes);
    info!(stage = "time_bucket", buckets = buckets.len(), "bucketed orders by desired delivery time");

    // S3 + S4: GEO_CLUSTER + ROUTE_PLAN. Buckets are processed sequentially
    // (spec.md §5: "the source does so sequentially and that is a valid
    // choice"). Results are appended in bucket-then-cluster order and later
    // sorted, so the final assignment is a pure function of (clusters
    // sorted by earliest_delivery_time, fetched driver order) regardless.
    let depot = depot_from_config(config);
    let mut clusters = Vec::new();
    for (time_window, bucket) in buckets {
        check_cancelled(cancellation)?;
        let groups = cluster_geo(
            &bucket,
            config.clustering.max_pizzas_per_cluster,
            config.clustering.cluster_distance_threshold,
            provider,
        )
        .await?;

        for mut group in groups {
            check_cancelled(cancellation)?;
            let route = compute_cluster_route(&mut group, &depot, provider).await?;
            let mut cluster = Cluster::new(time_window, group);
            cluster.cluster_route = Some(route);
            clusters.push(cluster);
        }
    }

    // §4.6: clusters sorted ascending by earliest_delivery_time before the
    // solver sees them.
    clusters.sort_by_key(|c| c.earliest_delivery_time);
    info!(stage = "geo_cluster", clusters = clusters.len(), "built and route-planned clusters");

    let order_ids_by_cluster: HashMap<ClusterId, Vec<OrderId>> =
        clusters.iter().map(|c| (c.id.clone(), c.order_ids())).collect();

    // PERSIST_CLUSTERS.
    check_cancelled(cancellation)?;
    for cluster in &clusters {
        store.create_cluster(cluster).await?;
    }

    // FETCH_DRIVERS.
    check_cancelled(cancellation)?;
    let eta_threshold = Duration::minutes(config.clustering.eta_threshold_minutes);
    let dispatchable_drivers: Vec<Driver> = store
        .fetch_drivers()
        .await?
        .into_iter()
        .filter(|d| d.is_dispatchable(now, eta_threshold))
        .collect();
    info!(stage = "fetch_drivers", dispatchable = dispatchable_drivers.len(), "fetched dispatchable drivers");

    // STRICT_ASSIGN.
    check_cancelled(cancellation)?;
    let profiles: Vec<AssignmentProfile> = clusters
        .iter()
        .map(|_| AssignmentProfile::from_config(&config.assignment))
        .collect();
    let strict_result = solve_with_profiles(
        &dispatchable_drivers,
        &clusters,
        &config.kitchen,
        &config.assignment,
        &profiles,
        now,
    );
    info!(
        stage = "strict_assign",
        assigned = strict_result.assignments.len(),
        deferred = strict_result.deferrals.len(),
        "strict pass complete"
    );

    // COMMIT₁: only for pairs actually won in the strict pass.
    check_cancelled(cancellation)?;
    commit_assignments(store, &strict_result.assignments, &order_ids_by_cluster).await?;

    // RELAX: salvage deferrals using drivers left idle after the strict pass.
    let assigned_cluster_ids: HashSet<ClusterId> =
        strict_result.assignments.iter().map(|a| a.cluster_id.clone()).collect();
    let (deferred_clusters, deferred_profiles): (Vec<Cluster>, Vec<AssignmentProfile>) = clusters
        .into_iter()
        .zip(profiles)
        .filter(|(c, _)| !assigned_cluster_ids.contains(&c.id))
        .unzip();

    check_cancelled(cancellation)?;
    let relaxation = RelaxationController::from_config(&config.assignment);
    let relax_outcome = relaxation.run(
        deferred_clusters,
        deferred_profiles,
        strict_result.remaining_drivers,
        &config.kitchen,
        &config.assignment,
        now,
    );
    info!(
        stage = "relax",
        assigned = relax_outcome.assignments.len(),
        still_deferred = relax_outcome.deferrals.len(),
        "relaxation rounds complete"
    );

    // COMMIT₂.
    check_cancelled(cancellation)?;
    commit_assignments(store, &relax_outcome.assignments, &order_ids_by_cluster).await?;

    let mut assignments = strict_result.assignments;
    assignments.extend(relax_outcome.assignments);

    Ok(AssignmentOutcome {
        assignments,
        deferrals: relax_outcome.deferrals,
    })
}

/// Commits one assignment batch: order status → assigned, cluster status →
/// assigned, driver status → delivering. A no-op for an empty batch (never
/// issues an empty `IN (...)`).
async fn commit_assignments(
    store: &dyn PersistenceStore,
    assignments: &[DriverAssignment],
    order_ids_by_cluster: &HashMap<ClusterId, Vec<OrderId>>,
) -> Result<()> {
    if assignments.is_empty() {
        return Ok(());
    }

    let driver_ids: Vec<DriverId> = assignments.iter().map(|a| a.driver_id).collect();
    let cluster_ids: Vec<ClusterId> = assignments.iter().map(|a| a.cluster_id.clone()).collect();
    let order_ids: Vec<OrderId> = assignments
        .iter()
        .flat_map(|a| order_ids_by_cluster.get(&a.cluster_id).cloned().unwrap_or_default())
        .collect();

    store.update_order_status(&order_ids, OrderStatus::Assigned).await?;
    store.update_cluster_status(&cluster_ids, ClusterStatus::Assigned).await?;
    store.update_driver_status(&driver_ids, DriverStatus::Delivering).await?;
    Ok(())
}
