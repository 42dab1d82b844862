//! Per-(driver, cluster) feasibility and cost, per spec.md §4.6 steps 1-7.

use chrono::{DateTime, Duration, Utc};

use crate::config::KitchenConfig;
use crate::error::DeferralReason;
use crate::models::{Cluster, Driver};
use crate::readiness::estimate_ready_time;

use super::profile::AssignmentProfile;

#[derive(Debug, Clone)]
pub enum PairEvaluation {
    Feasible { cost: f64 },
    Infeasible { reason: DeferralReason },
}

/// §9 Open Question, pinned rather than guessed: the source computes
/// `driver_ready_time = now − estimated_finish_time` when a finish time is
/// set — dimensionally a `Duration`, not a timestamp, fed into a later
/// timestamp subtraction. The intended expression is almost certainly
/// `driver_ready_time = estimated_finish_time` directly. Implemented
/// literally here (reinterpreting the duration as a Unix-epoch offset, the
/// closest Rust analogue of the Python bug's duck-typed behaviour) so the
/// current behaviour is pinned and testable; flipping this one function
/// and its accompanying property test is the entire fix if product
/// direction changes.
pub fn driver_ready_time_surrogate(now: DateTime<Utc>, estimated_finish_time: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match estimated_finish_time {
        Some(finish) => {
            let delta: Duration = now - finish;
            DateTime::<Utc>::from_timestamp(delta.num_seconds(), 0).unwrap_or(now)
        }
        None => now,
    }
}

/// Evaluates one (driver, cluster) pair per spec.md §4.6.
pub fn evaluate_pair(
    driver: &Driver,
    cluster: &Cluster,
    kitchen: &KitchenConfig,
    profile: &AssignmentProfile,
    time_for_payment_secs: i64,
    now: DateTime<Utc>,
) -> PairEvaluation {
    let route = match &cluster.cluster_route {
        Some(route) => route,
        None => {
            return PairEvaluation::Infeasible {
                reason: DeferralReason::NoFeasibleDriver,
            }
        }
    };

    let latest_prep_time = estimate_ready_time(cluster.total_items as u32, kitchen, now);
    let dispatch_ready_time = now.max(latest_prep_time);

    let driver_ready_time = driver_ready_time_surrogate(now, driver.estimated_finish_time);
    let wait_time = (dispatch_ready_time - driver_ready_time).num_seconds().max(0);

    // Per-order delivery times: cumulative segment duration plus a fixed
    // payment delay at every stop visited so far (segment i's cumulative
    // duration already covers the leg into stop i).
    let mut max_lateness_secs: i64 = 0;
    let mut max_hotness_secs: i64 = 0;
    for (i, order) in cluster.orders.iter().enumerate() {
        let segment = &route.segments[i];
        let delivery_time = dispatch_ready_time
            + Duration::seconds(segment.duration_from_start_secs as i64)
            + Duration::seconds(time_for_payment_secs * (i as i64 + 1));

        let lateness = (delivery_time - order.desired_delivery_time).num_seconds().max(0);
        max_lateness_secs = max_lateness_secs.max(lateness);

        let hotness = (delivery_time - dispatch_ready_time).num_seconds().max(0);
        max_hotness_secs = max_hotness_secs.max(hotness);

        if hotness > profile.constraints.max_hotness_minutes * 60 {
            return PairEvaluation::Infeasible {
                reason: DeferralReason::HotnessConstraintNotMet,
            };
        }
        if (delivery_time - cluster.earliest_delivery_time).num_seconds()
            > profile.constraints.lateness_tolerance_minutes * 60
        {
            return PairEvaluation::Infeasible {
                reason: DeferralReason::LatenessExceeded {
                    tolerance_minutes: profile.constraints.lateness_tolerance_minutes,
                },
            };
        }
    }

    let cost = profile.weights.wait_time * wait_time as f64
        + profile.weights.max_lateness * max_lateness_secs as f64
        + profile.weights.route_duration * route.total_duration_secs;

    PairEvaluation::Feasible { cost }
}
