use redis::{AsyncCommands, Client};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub const WINDOW_SECONDS: i64 = 60;

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("Redis connection error: {0}")]
    Connection(String),

    #[error("Redis error: {0}")]
    Redis(String),
}

/// Fixed-window attempt counter in Upstash Redis, used to slow down
/// password guessing at the admission gate.
#[derive(Clone)]
pub struct RateLimiter {
    client: Client,
    connection: Arc<Mutex<Option<redis::aio::MultiplexedConnection>>>,
    attempts_per_window: u32,
}

pub fn attempt_key(scope: &str, client_id: &str) -> String {
    format!("rate_limit:{}:{}", scope, client_id)
}

impl RateLimiter {
    pub fn new(redis_url: &str, attempts_per_window: u32) -> Result<Self, RateLimitError> {
        let client = Client::open(redis_url)
            .map_err(|e| RateLimitError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(None)),
            attempts_per_window,
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, RateLimitError> {
        let mut conn_guard = self.connection.lock().await;

        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| RateLimitError::Connection(e.to_string()))?;

        *conn_guard = Some(conn.clone());
        Ok(conn)
    }

    /// Counts one attempt for `client_id` in `scope`.
    /// Returns Ok(true) while the client is within its allowance.
    pub async fn check(&self, scope: &str, client_id: &str) -> Result<bool, RateLimitError> {
        let key = attempt_key(scope, client_id);
        let mut conn = self.get_connection().await?;

        let count: i64 = conn
            .incr(&key, 1)
            .await
            .map_err(|e| RateLimitError::Redis(e.to_string()))?;

        if count == 1 {
            let _: () = conn
                .expire(&key, WINDOW_SECONDS)
                .await
                .map_err(|e| RateLimitError::Redis(e.to_string()))?;
        }

        Ok(count <= self.attempts_per_window as i64)
    }
}
