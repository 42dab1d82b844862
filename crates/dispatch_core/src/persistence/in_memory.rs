//! In-process `PersistenceStore`, `tokio::sync::RwLock`-guarded the way the
//! engine's other shared state (the geo-distance cache) uses a `Mutex`
//! rather than reaching for a database in tests. The reference
//! implementation: every unit/integration test in this crate exercises it
//! directly instead of mocking the trait boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{Cluster, ClusterId, ClusterStatus, Driver, DriverId, Order, OrderId, OrderStatus};

use super::PersistenceStore;

#[derive(Default)]
pub struct InMemoryStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    drivers: RwLock<HashMap<DriverId, Driver>>,
    clusters: RwLock<HashMap<ClusterId, Cluster>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_order(&self, order: Order) {
        self.orders.write().await.insert(order.id, order);
    }

    pub async fn seed_driver(&self, driver: Driver) {
        self.drivers.write().await.insert(driver.id, driver);
    }

    pub async fn get_order(&self, id: OrderId) -> Option<Order> {
        self.orders.read().await.get(&id).cloned()
    }

    pub async fn get_driver(&self, id: DriverId) -> Option<Driver> {
        self.drivers.read().await.get(&id).cloned()
    }

    pub async fn get_cluster(&self, id: &ClusterId) -> Option<Cluster> {
        self.clusters.read().await.get(id).cloned()
    }

    pub async fn all_clusters(&self) -> Vec<Cluster> {
        self.clusters.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl PersistenceStore for InMemoryStore {
    async fn fetch_pending_orders(&self) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .cloned()
            .collect())
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
        Ok(self.drivers.read().await.values().cloned().collect())
    }

    async fn create_cluster(&self, cluster: &Cluster) -> Result<()> {
        self.clusters.write().await.insert(cluster.id.clone(), cluster.clone());
        Ok(())
    }

    async fn update_order_status(&self, order_ids: &[OrderId], status: OrderStatus) -> Result<()> {
        let mut orders = self.orders.write().await;
        for id in order_ids {
            if let Some(order) = orders.get_mut(id) {
                order.status = status;
            }
        }
        Ok(())
    }

    async fn update_cluster_status(&self, cluster_ids: &[ClusterId], status: ClusterStatus) -> Result<()> {
        let mut clusters = self.clusters.write().await;
        for id in cluster_ids {
            if let Some(cluster) = clusters.get_mut(id) {
                cluster.cluster_status = status;
            }
        }
        Ok(())
    }

    async fn update_driver_status(&self, driver_ids: &[DriverId], status: DriverStatus) -> Result<()> {
        let mut drivers = self.drivers.write().await;
        for id in driver_ids {
            if let Some(driver) = drivers.get_mut(id) {
                driver.status = status;
            }
        }
        Ok(())
    }
}
