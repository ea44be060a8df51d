use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use super::{OrderStore, StoreError};
use crate::models::{Order, OrderStatus};

/// Process-local order store for development and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl MemoryStore {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(RwLock::new(orders)),
        }
    }

    /// Seeds the store from a JSON array shaped like the dashboard query result.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::NotConfigured(format!("{}: {}", path.display(), e)))?;
        let orders: Vec<Order> =
            serde_json::from_str(&raw).map_err(|e| StoreError::Decode(e.to_string()))?;

        tracing::info!("Seeded memory store with {} orders", orders.len());
        Ok(Self::new(orders))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.read().await.clone())
    }

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        order.status = status.as_str().to_string();
        Ok(())
    }

    async fn delete_order(&self, order_id: &str) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| o.id != order_id);
        if orders.len() == before {
            return Err(StoreError::NotFound(order_id.to_string()));
        }
        Ok(())
    }
}
