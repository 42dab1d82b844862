//! Crate-wide error type.
//!
//! One `DispatchError` enum covers every failure mode named in the
//! dispatch engine's error design: provider/persistence failures propagate
//! with `#[source]`, configuration problems surface at startup, and
//! assignment infeasibility is carried as data (`DeferralReason`), never as
//! an error variant.

use thiserror::Error;

pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("route provider failed: {0}")]
    RouteProvider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("persistence operation failed: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("run was cancelled before completion")]
    Cancelled,
}

impl DispatchError {
    pub fn route_provider(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DispatchError::RouteProvider(Box::new(err))
    }

    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DispatchError::Persistence(Box::new(err))
    }

    pub fn configuration(message: impl ToString) -> Self {
        DispatchError::Configuration(message.to_string())
    }
}

impl From<config::ConfigError> for DispatchError {
    fn from(err: config::ConfigError) -> Self {
        DispatchError::Configuration(err.to_string())
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::RouteProvider(Box::new(err))
    }
}

/// Why a cluster was not assigned a driver in a given pass. A closed set,
/// not a bare string, so callers can match on it; `Display` renders the
/// exact motivation text the strict/relaxation passes record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferralReason {
    NoDriversAvailable,
    NoFeasibleDriver,
    NoDriverAvailable,
    HotnessConstraintNotMet,
    LatenessExceeded { tolerance_minutes: i64 },
}

impl std::fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeferralReason::NoDriversAvailable => write!(f, "No drivers available"),
            DeferralReason::NoFeasibleDriver => write!(f, "No feasible driver"),
            DeferralReason::NoDriverAvailable => write!(f, "No driver available"),
            DeferralReason::HotnessConstraintNotMet => write!(f, "Hotness constraint not met"),
            DeferralReason::LatenessExceeded { tolerance_minutes } => {
                write!(f, "Lateness > {tolerance_minutes} mins")
            }
        }
    }
}
