//! Assignment Solver (S6 strict pass). Builds a D×C cost matrix with
//! BIG_M-masked infeasible cells and solves a rectangular minimum-weight
//! assignment, grounded directly on
//! `sim_core::matching::hungarian::{I64Weights, HungarianMatching}`'s use
//! of `pathfinding::kuhn_munkres` — the same dependency, the same
//! dense-matrix + scale-to-i64 + smaller-set-as-rows pattern, generalised
//! from rider/driver matching to driver/cluster matching and from a
//! maximize-score convention to a minimize-cost one (costs are negated
//! before the call, since `kuhn_munkres` maximises).

use chrono::{DateTime, Utc};
use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

use crate::config::{AssignmentConfig, KitchenConfig};
use crate::error::DeferralReason;
use crate::models::{Cluster, ClusterDeferral, Driver, DriverAssignment};

use super::cost::{evaluate_pair, PairEvaluation};
use super::profile::AssignmentProfile;

const SCALE: f64 = 1_000_000.0;

struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        I64Weights(
            self.0
                .iter()
                .map(|r| r.iter().map(|&x| x.saturating_neg()).collect())
                .collect(),
        )
    }
}

pub struct StrictAssignmentResult {
    pub assignments: Vec<DriverAssignment>,
    pub deferrals: Vec<ClusterDeferral>,
    /// Drivers left idle after this pass, in original input order.
    pub remaining_drivers: Vec<Driver>,
}

/// Solves an assignment pass over the given drivers and clusters (clusters
/// are expected pre-sorted by `earliest_delivery_time`, per spec.md §4.6).
/// Shared by the strict pass and each relaxation round: profiles are
/// passed in explicitly so the relaxation controller can mutate them
/// between rounds without this function knowing about rounds at all.
pub fn solve_with_profiles(
    drivers: &[Driver],
    clusters: &[Cluster],
    kitchen: &KitchenConfig,
    assignment_config: &AssignmentConfig,
    profiles: &[AssignmentProfile],
    now: DateTime<Utc>,
) -> StrictAssignmentResult {
    if drivers.is_empty() {
        return StrictAssignmentResult {
            assignments: Vec::new(),
            deferrals: clusters
                .iter()
                .map(|c| ClusterDeferral {
                    cluster_id: c.id.clone(),
                    reason: DeferralReason::NoDriversAvailable,
                })
                .collect(),
            remaining_drivers: Vec::new(),
        };
    }
    if clusters.is_empty() {
        return StrictAssignmentResult {
            assignments: Vec::new(),
            deferrals: Vec::new(),
            remaining_drivers: drivers.to_vec(),
        };
    }

    let mut evaluations: Vec<Vec<PairEvaluation>> = Vec::with_capacity(drivers.len());
    let mut max_finite_cost = 0.0_f64;
    for driver in drivers {
        let mut row = Vec::with_capacity(clusters.len());
        for (cluster, profile) in clusters.iter().zip(profiles) {
            let evaluation = evaluate_pair(
                driver,
                cluster,
                kitchen,
                profile,
                assignment_config.time_for_payment_secs,
                now,
            );
            if let PairEvaluation::Feasible { cost } = &evaluation {
                max_finite_cost = max_finite_cost.max(*cost);
            }
            row.push(evaluation);
        }
        evaluations.push(row);
    }

    let has_any_feasible = evaluations
        .iter()
        .any(|row| row.iter().any(|e| matches!(e, PairEvaluation::Feasible { .. })));

    if !has_any_feasible {
        return StrictAssignmentResult {
            assignments: Vec::new(),
            deferrals: clusters
                .iter()
                .zip(evaluations.iter().map(|_| ()))
                .map(|(c, _)| ClusterDeferral {
                    cluster_id: c.id.clone(),
                    reason: first_reason(&evaluations, clusters, c),
                })
                .collect(),
            remaining_drivers: drivers.to_vec(),
        };
    }

    let big_m = (1.0_f64.max(max_finite_cost)) * 1_000_000.0;

    // Kuhn-Munkres requires rows <= columns; use the smaller dimension as
    // rows, the way sim_core's HungarianMatching orients its matrix.
    let drivers_as_rows = drivers.len() <= clusters.len();
    let (rows, cols) = if drivers_as_rows {
        (drivers.len(), clusters.len())
    } else {
        (clusters.len(), drivers.len())
    };

    let mut matrix = vec![vec![0i64; cols]; rows];
    for d in 0..drivers.len() {
        for c in 0..clusters.len() {
            let cost = match &evaluations[d][c] {
                PairEvaluation::Feasible { cost } => *cost,
                PairEvaluation::Infeasible { .. } => big_m,
            };
            let weight = to_weight(cost);
            if drivers_as_rows {
                matrix[d][c] = weight;
            } else {
                matrix[c][d] = weight;
            }
        }
    }

    let weights = I64Weights(matrix);
    let (_total, raw_assignment) = kuhn_munkres(&weights);

    let mut assigned_driver = vec![false; drivers.len()];
    let mut assigned_cluster = vec![false; clusters.len()];
    let mut assignments = Vec::new();

    for (row_idx, &col_idx) in raw_assignment.iter().enumerate() {
        let (driver_idx, cluster_idx) = if drivers_as_rows {
            (row_idx, col_idx)
        } else {
            (col_idx, row_idx)
        };
        if driver_idx >= drivers.len() || cluster_idx >= clusters.len() {
            continue;
        }
        let weight = weights.at(row_idx, col_idx);
        let cost = from_weight(weight);
        // Forced BIG_M placeholder: not a real assignment.
        if cost >= big_m / 2.0 {
            continue;
        }
        assigned_driver[driver_idx] = true;
        assigned_cluster[cluster_idx] = true;
        assignments.push(DriverAssignment {
            driver_id: drivers[driver_idx].id,
            cluster_id: clusters[cluster_idx].id.clone(),
            cost,
            relaxation_log: profiles[cluster_idx].log.clone(),
        });
    }

    let mut deferrals = Vec::new();
    for (idx, cluster) in clusters.iter().enumerate() {
        if assigned_cluster[idx] {
            continue;
        }
        deferrals.push(ClusterDeferral {
            cluster_id: cluster.id.clone(),
            reason: first_reason(&evaluations, clusters, cluster),
        });
    }

    let remaining_drivers = drivers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !assigned_driver[*idx])
        .map(|(_, d)| d.clone())
        .collect();

    StrictAssignmentResult {
        assignments,
        deferrals,
        remaining_drivers,
    }
}

/// The motivation recorded for a deferred cluster: the first infeasibility
/// reason encountered across all drivers, or "No driver available" if
/// every driver was feasible but the matrix shape (D<C) left it unpicked.
fn first_reason(evaluations: &[Vec<PairEvaluation>], clusters: &[Cluster], cluster: &Cluster) -> DeferralReason {
    let cluster_idx = clusters.iter().position(|c| c.id == cluster.id).unwrap_or(0);
    for row in evaluations {
        if let Some(PairEvaluation::Infeasible { reason }) = row.get(cluster_idx) {
            return reason.clone();
        }
    }
    DeferralReason::NoDriverAvailable
}

fn to_weight(cost: f64) -> i64 {
    let w = -cost * SCALE;
    if w >= i64::MAX as f64 {
        i64::MAX
    } else if w <= i64::MIN as f64 {
        i64::MIN
    } else {
        w as i64
    }
}

fn from_weight(weight: i64) -> f64 {
    -(weight as f64) / SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KitchenConfig;
    use crate::geo::Coordinate;
    use crate::route_planner::compute_cluster_route;
    use crate::route_provider::InMemoryRouteProvider;
    use crate::test_support::fixtures::{depot_at, driver_at, order_at};
    use chrono::Duration as ChronoDuration;

    async fn routed_cluster(id: i64, coordinate: Coordinate, now: DateTime<Utc>) -> Cluster {
        let provider = InMemoryRouteProvider::default();
        let depot = depot_at(Coordinate::new(0.0, 0.0));
        let mut orders = vec![order_at(id, coordinate, now + ChronoDuration::hours(1))];
        let route = compute_cluster_route(&mut orders, &depot, &provider).await.unwrap();
        let mut cluster = Cluster::new(now, orders);
        cluster.cluster_route = Some(route);
        cluster
    }

    #[tokio::test]
    async fn assigns_a_single_driver_to_a_single_feasible_cluster() {
        let now = Utc::now();
        let kitchen = KitchenConfig::default();
        let assignment_config = AssignmentConfig::default();
        let cluster = routed_cluster(1, Coordinate::new(0.001, 0.001), now).await;
        let profile = AssignmentProfile::from_config(&assignment_config);
        let driver = driver_at(1, Coordinate::new(0.0, 0.0));

        let result = solve_with_profiles(&[driver], &[cluster.clone()], &kitchen, &assignment_config, &[profile], now);

        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].cluster_id, cluster.id);
        assert_eq!(result.assignments[0].driver_id, 1);
        assert!(result.deferrals.is_empty());
        assert!(result.remaining_drivers.is_empty());
    }

    #[tokio::test]
    async fn no_drivers_defers_every_cluster_as_no_drivers_available() {
        let now = Utc::now();
        let kitchen = KitchenConfig::default();
        let assignment_config = AssignmentConfig::default();
        let cluster = routed_cluster(1, Coordinate::new(0.001, 0.001), now).await;
        let profile = AssignmentProfile::from_config(&assignment_config);

        let result = solve_with_profiles(&[], &[cluster.clone()], &kitchen, &assignment_config, &[profile], now);

        assert!(result.assignments.is_empty());
        assert_eq!(result.deferrals.len(), 1);
        assert_eq!(result.deferrals[0].reason, DeferralReason::NoDriversAvailable);
    }

    #[tokio::test]
    async fn picks_the_cheaper_cluster_when_drivers_are_scarce() {
        let now = Utc::now();
        let kitchen = KitchenConfig::default();
        let assignment_config = AssignmentConfig::default();
        let near = routed_cluster(1, Coordinate::new(0.001, 0.001), now).await;
        let far = routed_cluster(2, Coordinate::new(0.2, 0.2), now).await;
        let profiles = vec![
            AssignmentProfile::from_config(&assignment_config),
            AssignmentProfile::from_config(&assignment_config),
        ];
        let driver = driver_at(1, Coordinate::new(0.0, 0.0));

        let result = solve_with_profiles(
            &[driver],
            &[near.clone(), far.clone()],
            &kitchen,
            &assignment_config,
            &profiles,
            now,
        );

        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].cluster_id, near.id);
        assert_eq!(result.deferrals.len(), 1);
        assert_eq!(result.deferrals[0].cluster_id, far.id);
    }

    #[tokio::test]
    async fn a_cluster_breaching_hotness_is_deferred_with_the_right_reason() {
        let now = Utc::now();
        let kitchen = KitchenConfig::default();
        // A route duration this tiny driver distance can't possibly satisfy.
        let assignment_config = AssignmentConfig {
            max_hotness_minutes: 0,
            ..AssignmentConfig::default()
        };
        let cluster = routed_cluster(1, Coordinate::new(0.05, 0.05), now).await;
        let profile = AssignmentProfile::from_config(&assignment_config);
        let driver = driver_at(1, Coordinate::new(0.0, 0.0));

        let result = solve_with_profiles(&[driver], &[cluster.clone()], &kitchen, &assignment_config, &[profile], now);

        assert!(result.assignments.is_empty());
        assert_eq!(result.deferrals.len(), 1);
        assert_eq!(result.deferrals[0].reason, DeferralReason::HotnessConstraintNotMet);
    }
}
