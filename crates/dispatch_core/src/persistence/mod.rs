//! Persistence Store adapter surface (spec.md §6). The engine depends on
//! nothing but this trait; `InMemoryStore` is the reference implementation
//! every test in this crate exercises directly (grounded on `sim_core`'s
//! `test_helpers.rs` pattern of a ready-made in-process fixture rather than
//! a mock), and `sea_orm_store` (behind the `sea-orm-store` feature) is a
//! real adapter over the schema of §6, grounded on `stateset-api`'s
//! `repositories::order_repository` — `sim_core` carries no persistence
//! layer at all.

pub mod in_memory;

#[cfg(feature = "sea-orm-store")]
pub mod entities;
#[cfg(feature = "sea-orm-store")]
pub mod sea_orm_store;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Cluster, ClusterId, ClusterStatus, Driver, DriverId, Order, OrderId, OrderStatus};

pub use in_memory::InMemoryStore;
#[cfg(feature = "sea-orm-store")]
pub use sea_orm_store::SeaOrmStore;

/// The six operations the engine consumes, per spec.md §6. Every mutation
/// here commits independently (no cross-stage transaction, §5); batch
/// updates take the whole id slice so an implementation can use a single
/// `IN (...)` write.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// `query(Order).filter(status=="pending").all()`.
    async fn fetch_pending_orders(&self) -> Result<Vec<Order>>;

    /// All known drivers; the engine applies the §3 dispatchability
    /// predicate itself (it needs `now` and `eta_threshold`, which this
    /// store-level call does not carry).
    async fn fetch_drivers(&self) -> Result<Vec<Driver>>;

    /// Inserts the cluster row and its (cluster_id, order_id) join rows.
    async fn create_cluster(&self, cluster: &Cluster) -> Result<()>;

    async fn update_order_status(&self, order_ids: &[OrderId], status: OrderStatus) -> Result<()>;

    async fn update_cluster_status(&self, cluster_ids: &[ClusterId], status: ClusterStatus) -> Result<()>;

    async fn update_driver_status(&self, driver_ids: &[DriverId], status: DriverStatus) -> Result<()>;
}
