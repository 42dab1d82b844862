//! Per-cluster assignment profile: constraints, weights, and a relaxation
//! log. Spec.md §9 "Runtime-typed assignment profiles": modelled as a
//! typed value (not the source's plain dict-like record), with relaxation
//! strategies as pure functions over it.

use serde::{Deserialize, Serialize};

use crate::config::AssignmentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub max_hotness_minutes: i64,
    pub lateness_tolerance_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub wait_time: f64,
    pub max_lateness: f64,
    pub route_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentProfile {
    pub constraints: Constraints,
    pub weights: Weights,
    pub log: Vec<String>,
}

impl AssignmentProfile {
    pub fn from_config(config: &AssignmentConfig) -> Self {
        Self {
            constraints: Constraints {
                max_hotness_minutes: config.max_hotness_minutes,
                lateness_tolerance_minutes: config.lateness_tolerance_minutes,
            },
            weights: Weights {
                wait_time: config.wait_time_weight,
                max_lateness: config.max_lateness_weight,
                route_duration: config.route_duration_weight,
            },
            log: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_carries_constraints_and_weights_verbatim() {
        let config = AssignmentConfig {
            max_hotness_minutes: 42,
            lateness_tolerance_minutes: 7,
            wait_time_weight: 0.1,
            max_lateness_weight: 0.6,
            route_duration_weight: 0.3,
            ..AssignmentConfig::default()
        };

        let profile = AssignmentProfile::from_config(&config);

        assert_eq!(profile.constraints.max_hotness_minutes, 42);
        assert_eq!(profile.constraints.lateness_tolerance_minutes, 7);
        assert_eq!(profile.weights.wait_time, 0.1);
        assert_eq!(profile.weights.max_lateness, 0.6);
        assert_eq!(profile.weights.route_duration, 0.3);
        assert!(profile.log.is_empty());
    }

    #[test]
    fn two_profiles_from_the_same_config_are_equal() {
        let config = AssignmentConfig::default();
        assert_eq!(AssignmentProfile::from_config(&config), AssignmentProfile::from_config(&config));
    }
}
