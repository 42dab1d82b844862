//! `sea-orm`-backed `PersistenceStore` over the schema of spec.md §6,
//! grounded on `stateset-api::repositories::order_repository`'s
//! find/create/update shape — `sim_core` carries no persistence layer at
//! all, so this concern is imported wholesale from the sibling
//! backend-service example. Feature-gated behind `sea-orm-store` since raw
//! persistence mechanics are explicitly out of scope and most callers run
//! against `InMemoryStore`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::error::{DispatchError, Result};
use crate::models::order::{DeliveryAddress, Items};
use crate::models::{
    Cluster, ClusterId, ClusterStatus, Driver, DriverId, DriverStatus, Order, OrderId, OrderStatus,
};
use crate::geo::Coordinate;

use super::entities::{driver, order, order_cluster, order_cluster_association};
use super::PersistenceStore;

pub struct SeaOrmStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn status_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Preparing => "preparing",
        OrderStatus::Assigned => "assigned",
        OrderStatus::Delivering => "delivering",
        OrderStatus::Delivered => "delivered",
        OrderStatus::Cancelled => "cancelled",
    }
}

fn parse_order_status(raw: &str) -> OrderStatus {
    match raw {
        "preparing" => OrderStatus::Preparing,
        "assigned" => OrderStatus::Assigned,
        "delivering" => OrderStatus::Delivering,
        "delivered" => OrderStatus::Delivered,
        "cancelled" => OrderStatus::Cancelled,
        _ => OrderStatus::Pending,
    }
}

fn driver_status_str(status: DriverStatus) -> &'static str {
    match status {
        DriverStatus::Available => "available",
        DriverStatus::Delivering => "delivering",
        DriverStatus::Offline => "offline",
    }
}

fn parse_driver_status(raw: &str) -> DriverStatus {
    match raw {
        "delivering" => DriverStatus::Delivering,
        "offline" => DriverStatus::Offline,
        _ => DriverStatus::Available,
    }
}

fn cluster_status_str(status: ClusterStatus) -> &'static str {
    match status {
        ClusterStatus::ToBeAssigned => "to_be_assigned",
        ClusterStatus::Assigned => "assigned",
        ClusterStatus::Delivered => "delivered",
        ClusterStatus::Cancelled => "cancelled",
    }
}

fn model_to_order(model: order::Model) -> Result<Order> {
    let delivery_address: DeliveryAddress =
        serde_json::from_value(model.delivery_address).map_err(DispatchError::persistence)?;
    let items: Items = serde_json::from_value(model.items).map_err(DispatchError::persistence)?;
    Ok(Order {
        id: model.id,
        creator_id: model.creator_id,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        delivery_address,
        coordinate: Coordinate::new(model.lon, model.lat),
        items,
        estimated_prep_time: model.estimated_prep_time,
        desired_delivery_time: model.desired_delivery_time,
        priority: model.priority,
        status: parse_order_status(&model.status),
        created_at: model.created_at,
    })
}

fn model_to_driver(model: driver::Model) -> Driver {
    Driver {
        id: model.id,
        user_id: model.user_id,
        full_name: model.full_name,
        is_active: model.is_active,
        status: parse_driver_status(&model.status),
        coordinate: match (model.lon, model.lat) {
            (Some(lon), Some(lat)) => Some(Coordinate::new(lon, lat)),
            _ => None,
        },
        current_route: model.current_route,
        estimated_finish_time: model.estimated_finish_time,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl PersistenceStore for SeaOrmStore {
    async fn fetch_pending_orders(&self) -> Result<Vec<Order>> {
        let rows = order::Entity::find()
            .filter(order::Column::Status.eq("pending"))
            .all(self.db.as_ref())
            .await
            .map_err(DispatchError::persistence)?;
        rows.into_iter().map(model_to_order).collect()
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
        let rows = driver::Entity::find()
            .all(self.db.as_ref())
            .await
            .map_err(DispatchError::persistence)?;
        Ok(rows.into_iter().map(model_to_driver).collect())
    }

    async fn create_cluster(&self, cluster: &Cluster) -> Result<()> {
        let relaxed_constraints = cluster
            .relaxed_constraints
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(DispatchError::persistence)?;
        let cluster_route = cluster
            .cluster_route
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(DispatchError::persistence)?;

        let active = order_cluster::ActiveModel {
            id: Set(cluster.id.clone()),
            time_window: Set(cluster.time_window),
            total_items: Set(cluster.total_items as i64),
            earliest_delivery_time: Set(cluster.earliest_delivery_time),
            cluster_route: Set(cluster_route),
            cluster_status: Set(cluster_status_str(cluster.cluster_status).to_string()),
            relaxed_constraints: Set(relaxed_constraints),
        };
        active.insert(self.db.as_ref()).await.map_err(DispatchError::persistence)?;

        for order_id in cluster.order_ids() {
            let join = order_cluster_association::ActiveModel {
                cluster_id: Set(cluster.id.clone()),
                order_id: Set(order_id),
            };
            join.insert(self.db.as_ref()).await.map_err(DispatchError::persistence)?;
        }
        Ok(())
    }

    async fn update_order_status(&self, order_ids: &[OrderId], status: OrderStatus) -> Result<()> {
        order::Entity::update_many()
            .col_expr(
                order::Column::Status,
                sea_orm::sea_query::Expr::value(status_str(status)),
            )
            .filter(order::Column::Id.is_in(order_ids.iter().copied()))
            .exec(self.db.as_ref())
            .await
            .map_err(DispatchError::persistence)?;
        Ok(())
    }

    async fn update_cluster_status(&self, cluster_ids: &[ClusterId], status: ClusterStatus) -> Result<()> {
        order_cluster::Entity::update_many()
            .col_expr(
                order_cluster::Column::ClusterStatus,
                sea_orm::sea_query::Expr::value(cluster_status_str(status)),
            )
            .filter(order_cluster::Column::Id.is_in(cluster_ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(DispatchError::persistence)?;
        Ok(())
    }

    async fn update_driver_status(&self, driver_ids: &[DriverId], status: DriverStatus) -> Result<()> {
        driver::Entity::update_many()
            .col_expr(
                driver::Column::Status,
                sea_orm::sea_query::Expr::value(driver_status_str(status)),
            )
            .col_expr(
                driver::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(driver::Column::Id.is_in(driver_ids.iter().copied()))
            .exec(self.db.as_ref())
            .await
            .map_err(DispatchError::persistence)?;
        Ok(())
    }
}
