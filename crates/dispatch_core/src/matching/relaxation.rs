//! Relaxation Controller (§4.7). After the strict pass commits, attempts to
//! salvage deferred clusters by progressively loosening each deferred
//! cluster's own constraints and re-running the solver over the shrinking
//! deferral/driver pools, round by round, until a round assigns nothing or
//! either pool empties.
//!
//! Grounded directly on spec.md §4.7/§9: strategies are plain functions over
//! `(profile, round_n)`, registered as a list rather than discovered by
//! reflection (the source's dict-of-callables pattern), matching `matching
//! ::profile`'s choice of a typed value over a runtime-typed record.

use chrono::{DateTime, Utc};

use crate::config::{AssignmentConfig, KitchenConfig};
use crate::models::{Cluster, ClusterDeferral, Driver, DriverAssignment};

use super::profile::AssignmentProfile;
use super::solver::solve_with_profiles;

/// A pure (except for its log append) constraint-loosening step, applied to
/// one cluster's profile for one relaxation round.
pub type RelaxationStrategy = fn(&mut AssignmentProfile, round: u32);

/// `relax_hotness(profile, round_n)`: `max_hotness ← 20 + 5·round_n`.
pub fn relax_hotness(profile: &mut AssignmentProfile, round: u32) {
    let relaxed = 20 + 5 * round as i64;
    profile.constraints.max_hotness_minutes = relaxed;
    profile.log.push(format!("Relaxed hotness tolerance to {relaxed} mins"));
}

/// `relax_lateness(profile, round_n)`: `lateness_tol ← 10 + 5·round_n`.
pub fn relax_lateness(profile: &mut AssignmentProfile, round: u32) {
    let relaxed = 10 + 5 * round as i64;
    profile.constraints.lateness_tolerance_minutes = relaxed;
    profile.log.push(format!("Relaxed lateness tolerance to {relaxed} mins"));
}

/// The canonical strategy order: both constraints loosen together each
/// round, matching spec.md §4.7's two listed strategies.
pub fn default_strategies() -> Vec<RelaxationStrategy> {
    vec![relax_hotness, relax_lateness]
}

pub struct RelaxationOutcome {
    pub assignments: Vec<DriverAssignment>,
    pub deferrals: Vec<ClusterDeferral>,
}

pub struct RelaxationController {
    strategies: Vec<RelaxationStrategy>,
    max_rounds: u32,
}

impl RelaxationController {
    pub fn new(strategies: Vec<RelaxationStrategy>, max_rounds: u32) -> Self {
        Self { strategies, max_rounds }
    }

    pub fn from_config(assignment_config: &AssignmentConfig) -> Self {
        Self::new(default_strategies(), assignment_config.max_relaxation_rounds)
    }

    /// Runs up to `max_rounds` relaxation rounds over `clusters` (still
    /// deferred after the strict pass, each carrying its own mutable
    /// profile) and `drivers` (idle after the strict pass). Returns every
    /// pair won during relaxation plus the final deferral motivation for
    /// clusters that remain unassigned.
    pub fn run(
        &self,
        mut clusters: Vec<Cluster>,
        mut profiles: Vec<AssignmentProfile>,
        mut drivers: Vec<Driver>,
        kitchen: &KitchenConfig,
        assignment_config: &AssignmentConfig,
        now: DateTime<Utc>,
    ) -> RelaxationOutcome {
        debug_assert_eq!(clusters.len(), profiles.len());

        let mut assignments = Vec::new();
        let mut last_deferrals: Vec<ClusterDeferral> = Vec::new();

        for round in 1..=self.max_rounds {
            if clusters.is_empty() {
                break;
            }

            for profile in profiles.iter_mut() {
                for strategy in &self.strategies {
                    strategy(profile, round);
                }
            }

            let result = solve_with_profiles(&drivers, &clusters, kitchen, assignment_config, &profiles, now);
            last_deferrals = result.deferrals.clone();

            if result.assignments.is_empty() {
                // Nothing won this round, but later rounds loosen the
                // thresholds further (they are absolute, not incremental),
                // so a dry round on its own isn't proof the next one will
                // be too. Only an empty driver pool is — nothing left to
                // assign with, ever.
                if drivers.is_empty() {
                    break;
                }
                continue;
            }

            let won_cluster_ids: std::collections::HashSet<_> =
                result.assignments.iter().map(|a| a.cluster_id.clone()).collect();

            let mut remaining_clusters = Vec::new();
            let mut remaining_profiles = Vec::new();
            for (mut cluster, profile) in clusters.into_iter().zip(profiles.into_iter()) {
                if won_cluster_ids.contains(&cluster.id) {
                    continue;
                }
                cluster.relaxed_constraints = Some(profile.clone());
                remaining_clusters.push(cluster);
                remaining_profiles.push(profile);
            }

            assignments.extend(result.assignments);
            clusters = remaining_clusters;
            profiles = remaining_profiles;
            drivers = result.remaining_drivers;
        }

        // Any cluster never re-evaluated (loop stopped before its round, or
        // max_rounds == 0) still needs a deferral entry with its last known
        // motivation.
        let evaluated: std::collections::HashSet<_> =
            last_deferrals.iter().map(|d| d.cluster_id.clone()).collect();
        for (cluster, _) in clusters.iter().zip(profiles.iter()) {
            if !evaluated.contains(&cluster.id) {
                last_deferrals.push(ClusterDeferral {
                    cluster_id: cluster.id.clone(),
                    reason: crate::error::DeferralReason::NoDriverAvailable,
                });
            }
        }

        RelaxationOutcome {
            assignments,
            deferrals: last_deferrals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeferralReason;
    use crate::geo::Coordinate;
    use crate::models::Cluster;
    use crate::route_provider::InMemoryRouteProvider;
    use crate::test_support::fixtures::{depot_at, driver_at, order_at};
    use chrono::Duration;

    async fn cluster_far_from_depot(id: i64, now: DateTime<Utc>) -> Cluster {
        let provider = InMemoryRouteProvider::default();
        let depot = depot_at(Coordinate::new(0.0, 0.0));
        // Far enough that cumulative route duration breaches a 20-minute
        // hotness bound at ~30 km/h but not a 25-30 minute one.
        let mut orders = vec![order_at(id, Coordinate::new(0.0, 0.12), now + Duration::hours(1))];
        let route = crate::route_planner::compute_cluster_route(&mut orders, &depot, &provider)
            .await
            .unwrap();
        let mut cluster = Cluster::new(now, orders);
        cluster.cluster_route = Some(route);
        cluster
    }

    #[tokio::test]
    async fn relaxing_hotness_eventually_salvages_a_deferred_cluster() {
        let now = Utc::now();
        let kitchen = KitchenConfig::default();
        let assignment_config = AssignmentConfig {
            max_hotness_minutes: 1,
            ..AssignmentConfig::default()
        };
        let cluster = cluster_far_from_depot(1, now).await;
        let profile = AssignmentProfile::from_config(&assignment_config);
        let driver = driver_at(1, Coordinate::new(0.0, 0.0));

        let controller = RelaxationController::new(default_strategies(), 5);
        let outcome = controller.run(vec![cluster], vec![profile], vec![driver], &kitchen, &assignment_config, now);

        assert_eq!(outcome.assignments.len(), 1);
        assert!(outcome.assignments[0]
            .relaxation_log
            .iter()
            .any(|line| line.starts_with("Relaxed hotness tolerance to")));
    }

    #[tokio::test]
    async fn stops_early_on_a_dry_round() {
        let now = Utc::now();
        let kitchen = KitchenConfig::default();
        let assignment_config = AssignmentConfig::default();
        // No drivers at all: every round is dry immediately.
        let cluster = cluster_far_from_depot(1, now).await;
        let profile = AssignmentProfile::from_config(&assignment_config);

        let controller = RelaxationController::new(default_strategies(), 3);
        let outcome = controller.run(vec![cluster], vec![profile], vec![], &kitchen, &assignment_config, now);

        assert!(outcome.assignments.is_empty());
        assert_eq!(outcome.deferrals.len(), 1);
        assert_eq!(outcome.deferrals[0].reason, DeferralReason::NoDriversAvailable);
    }
}
