//! Cheap, deterministic builders for `Order`, `Driver`, and `Depot` test
//! fixtures, the way `sim_core`'s `test_helpers::test_cell` gives every
//! test file one canonical input to build from.

use chrono::{DateTime, Utc};

use crate::geo::Coordinate;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::order::{DeliveryAddress, Items, Order, OrderStatus};
use crate::route_planner::Depot;

/// A single-pizza order at the given coordinate and desired delivery time.
pub fn order_at(id: i64, coordinate: Coordinate, desired_delivery_time: DateTime<Utc>) -> Order {
    order_with_food_count(id, coordinate, desired_delivery_time, 1)
}

/// An order whose `food` inventory has exactly `food_count` items, for
/// capacity-split tests (§8 invariant 5).
pub fn order_with_food_count(
    id: i64,
    coordinate: Coordinate,
    desired_delivery_time: DateTime<Utc>,
    food_count: usize,
) -> Order {
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

/// A depot fixture at the given coordinate.
pub fn depot_at(coordinate: Coordinate) -> Depot {
    Depot {
        coordinate,
        address: DeliveryAddress {
            address: "Depot".to_string(),
            postal_code: "00000".to_string(),
            city: "Testville".to_string(),
            country: "IT".to_string(),
        },
    }
}

/// An available, dispatchable driver at the given coordinate.
pub fn driver_at(id: i64, coordinate: Coordinate) -> Driver {
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
