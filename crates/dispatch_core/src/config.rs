//! Environment-driven configuration, layered over typed defaults the way
//! `stateset-api::config` layers `config::Environment` over a `serde`
//! struct — `sim_core` carries no configuration crate at all (its
//! `ScenarioParams` is a hand-built `Default` + builder-method struct), so
//! this module's shape is imported wholesale from the sibling
//! backend-service example.

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::{DispatchError, Result};

fn default_max_pizzas_per_cluster() -> u32 {
    10
}

fn default_cluster_time_window_minutes() -> i64 {
    15
}

fn default_cluster_distance_threshold() -> f64 {
    120.0
}

fn default_eta_threshold_minutes() -> i64 {
    10
}

fn default_time_for_payment_secs() -> i64 {
    120
}

fn default_max_hotness_minutes() -> i64 {
    20
}

fn default_lateness_tolerance_minutes() -> i64 {
    10
}

fn default_max_relaxation_rounds() -> u32 {
    3
}

/// The unit a `RouteProvider`'s distance matrix is expressed in. Spec.md §9
/// flags `CLUSTER_DISTANCE_THRESHOLD` as unit-ambiguous in the source; this
/// field exists precisely so the unit is never implicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Duration,
    Distance,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default = "default_max_pizzas_per_cluster")]
    pub max_pizzas_per_cluster: u32,
    #[serde(default = "default_cluster_time_window_minutes")]
    pub cluster_time_window_minutes: i64,
    #[serde(default = "default_cluster_distance_threshold")]
    pub cluster_distance_threshold: f64,
    #[serde(default = "default_eta_threshold_minutes")]
    pub eta_threshold_minutes: i64,
    pub depot_lon: f64,
    pub depot_lat: f64,
    pub depot_address: String,
    pub depot_postal_code: String,
    pub depot_city: String,
    pub depot_country: String,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_pizzas_per_cluster: default_max_pizzas_per_cluster(),
            cluster_time_window_minutes: default_cluster_time_window_minutes(),
            cluster_distance_threshold: default_cluster_distance_threshold(),
            eta_threshold_minutes: default_eta_threshold_minutes(),
            depot_lon: 9.1900,
            depot_lat: 45.4642,
            depot_address: "Via Roma 1".to_string(),
            depot_postal_code: "20100".to_string(),
            depot_city: "Milano".to_string(),
            depot_country: "IT".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChefExperience {
    Junior,
    Middle,
    Senior,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PizzaType {
    RuotaDiCarroNapoletana,
    Napoletana,
    Contemporanea,
    Classica,
}

#[derive(Clone, Debug, Deserialize)]
pub struct KitchenConfig {
    pub chefs: u32,
    pub chef_experience: ChefExperience,
    /// Pizzas completable per 120s cycle, keyed by experience level.
    pub chef_capacity: std::collections::HashMap<String, u32>,
    /// Bake duration in seconds, keyed by pizza type.
    pub bake_times: std::collections::HashMap<String, i64>,
    pub num_ovens: u32,
    pub single_oven_capacity: u32,
    pub pizza_type: PizzaType,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let mut chef_capacity = std::collections::HashMap::new();
        chef_capacity.insert("junior".to_string(), 2);
        chef_capacity.insert("middle".to_string(), 3);
        chef_capacity.insert("senior".to_string(), 4);

        let mut bake_times = std::collections::HashMap::new();
        bake_times.insert("ruota_di_carro_napoletana".to_string(), 90);
        bake_times.insert("napoletana".to_string(), 90);
        bake_times.insert("contemporanea".to_string(), 120);
        bake_times.insert("classica".to_string(), 150);

        Self {
            chefs: 2,
            chef_experience: ChefExperience::Middle,
            chef_capacity,
            bake_times,
            num_ovens: 1,
            single_oven_capacity: 5,
            pizza_type: PizzaType::Napoletana,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteProviderConfig {
    /// Selects the concrete `RouteProvider` implementation to build.
    #[serde(default)]
    pub kind: RouteProviderKindConfig,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub profile: Option<String>,
    /// Required, non-defaulted: see §9 Open Questions on the threshold's
    /// unit ambiguity.
    pub metric: Metric,
    pub units: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteProviderKindConfig {
    #[default]
    Http,
    InMemory,
}

impl Default for RouteProviderConfig {
    fn default() -> Self {
        Self {
            kind: RouteProviderKindConfig::default(),
            endpoint: None,
            api_key: None,
            profile: Some("driving-car".to_string()),
            metric: Metric::Duration,
            units: Some("m".to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssignmentConfig {
    #[serde(default = "default_time_for_payment_secs")]
    pub time_for_payment_secs: i64,
    #[serde(default = "default_max_hotness_minutes")]
    pub max_hotness_minutes: i64,
    #[serde(default = "default_lateness_tolerance_minutes")]
    pub lateness_tolerance_minutes: i64,
    #[serde(default = "default_max_relaxation_rounds")]
    pub max_relaxation_rounds: u32,
    pub wait_time_weight: f64,
    pub max_lateness_weight: f64,
    pub route_duration_weight: f64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            time_for_payment_secs: default_time_for_payment_secs(),
            max_hotness_minutes: default_max_hotness_minutes(),
            lateness_tolerance_minutes: default_lateness_tolerance_minutes(),
            max_relaxation_rounds: default_max_relaxation_rounds(),
            wait_time_weight: 0.2,
            max_lateness_weight: 0.5,
            route_duration_weight: 0.3,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub kitchen: KitchenConfig,
    #[serde(default)]
    pub route_provider: RouteProviderConfig,
    #[serde(default)]
    pub assignment: AssignmentConfig,
}

impl DispatchConfig {
    /// Loads configuration from environment variables prefixed `DISPATCH_`,
    /// layered over the struct-level `Default` impls (nested fields use
    /// `__` as the separator, e.g. `DISPATCH_KITCHEN__CHEFS`).
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .add_source(Environment::with_prefix("DISPATCH").separator("__"))
            .build()?;

        match settings.try_deserialize() {
            Ok(config) => Ok(config),
            Err(config::ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(err) => Err(DispatchError::from(err)),
        }
    }
}
