use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Order, OrderStatus};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Store API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

/// The order collection as seen by the admin panel. Implementations hold
/// whatever credential the backing store needs; callers never see it.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Every order, with cart item products dereferenced.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    /// Patches only the `status` field of one order.
    async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StoreError>;
    async fn delete_order(&self, order_id: &str) -> Result<(), StoreError>;
}
