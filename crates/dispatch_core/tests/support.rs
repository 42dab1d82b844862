//! Fixture builders for the end-to-end scenario tests in this directory,
//! built from the public API only (integration tests link the crate the
//! way an external consumer would, not the in-crate `test_support`
//! module).

use chrono::{DateTime, Utc};

use dispatch_core::config::{AssignmentConfig, ClusteringConfig, DispatchConfig, KitchenConfig, Metric, RouteProviderConfig, RouteProviderKindConfig};
use dispatch_core::geo::Coordinate;
use dispatch_core::models::driver::{Driver, DriverStatus};
use dispatch_core::models::order::{DeliveryAddress, Items, Order, OrderStatus};
use dispatch_core::route_planner::Depot;

pub fn order(id: i64, coordinate: Coordinate, desired_delivery_time: DateTime<Utc>, food_count: usize) -> Order {
    Order {
        id,
        creator_id: 1,
        customer_name: format!("Customer {id}"),
        customer_phone: "000-000-0000".to_string(),
        delivery_address: DeliveryAddress {
            address: format!("{id} Test Street"),
            postal_code: "00000".to_string(),
            city: "Testville".to_string(),
            country: "IT".to_string(),
        },
        coordinate,
        items: Items {
            food: (0..food_count).map(|i| format!("pizza-{id}-{i}")).collect(),
            drink: Vec::new(),
        },
        estimated_prep_time: None,
        desired_delivery_time,
        priority: false,
        status: OrderStatus::Pending,
        created_at: desired_delivery_time,
    }
}

pub fn driver(id: i64, coordinate: Coordinate) -> Driver {
    let now = Utc::now();
    Driver {
        id,
        user_id: id,
        full_name: format!("Driver {id}"),
        is_active: true,
        status: DriverStatus::Available,
        coordinate: Some(coordinate),
        current_route: None,
        estimated_finish_time: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn depot() -> Depot {
    Depot {
        coordinate: Coordinate::new(0.0, 0.0),
        address: DeliveryAddress {
            address: "Depot".to_string(),
            postal_code: "00000".to_string(),
            city: "Testville".to_string(),
            country: "IT".to_string(),
        },
    }
}

/// A `DispatchConfig` pointed at the origin depot, the in-memory route
/// provider, and a generous cluster distance threshold so geometry in
/// these scenarios doesn't have to fight the clustering cutoff too.
pub fn base_config() -> DispatchConfig {
    DispatchConfig {
        clustering: ClusteringConfig {
            depot_lon: 0.0,
            depot_lat: 0.0,
            cluster_distance_threshold: 1_000_000.0,
            ..ClusteringConfig::default()
        },
        kitchen: KitchenConfig::default(),
        route_provider: RouteProviderConfig {
            kind: RouteProviderKindConfig::InMemory,
            metric: Metric::Duration,
            ..RouteProviderConfig::default()
        },
        assignment: AssignmentConfig::default(),
    }
}
