use serde::{Deserialize, Serialize};

use super::cluster::ClusterId;
use super::driver::DriverId;
use crate::error::DeferralReason;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverAssignment {
    pub driver_id: DriverId,
    pub cluster_id: ClusterId,
    pub cost: f64,
    pub relaxation_log: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ClusterDeferral {
    pub cluster_id: ClusterId,
    pub reason: DeferralReason,
}

/// Result of a full dispatch run: every cluster is either in
/// `assignments` (driver → cluster) or `deferrals` (cluster → reason),
/// never both and never neither.
#[derive(Debug, Clone, Default)]
pub struct AssignmentOutcome {
    pub assignments: Vec<DriverAssignment>,
    pub deferrals: Vec<ClusterDeferral>,
}
