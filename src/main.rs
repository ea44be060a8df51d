mod config;
mod dashboard;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod storage;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::routes::{create_router, AppState};
use crate::services::{ClerkService, IdentityResolver, JwksVerifier, RateLimiter};
use crate::storage::{MemoryStore, OrderStore, SanityStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopco_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    if config.admin_password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD is empty - password sign-in disabled");
    }

    let store = create_store(&config).await?;

    // Clerk identity
    let jwks = JwksVerifier::new(&config.clerk_jwks_url);
    match jwks.initialize().await {
        Ok(count) => tracing::info!("JWKS cache initialized with {} keys", count),
        Err(e) => {
            tracing::warn!("Failed to initialize JWKS cache: {} - will retry on first request", e)
        }
    }
    let clerk = ClerkService::new(&config.clerk_api_url, &config.clerk_secret_key);
    let identity = IdentityResolver::new(jwks, clerk);

    // Initialize Upstash rate limiter if configured
    let rate_limiter = match &config.upstash_redis_url {
        Some(url) => match RateLimiter::new(url, config.rate_limit_login) {
            Ok(limiter) => {
                tracing::info!(
                    "Upstash Redis rate limiter configured ({} login attempts/min)",
                    config.rate_limit_login
                );
                Some(limiter)
            }
            Err(e) => {
                tracing::error!("Failed to initialize rate limiter: {} - rate limiting disabled", e);
                None
            }
        },
        None => {
            tracing::warn!("Upstash Redis not configured - rate limiting disabled");
            None
        }
    };

    let state = AppState::new(config.clone(), store, identity, rate_limiter);
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Admin panel: {}/gallium/", config.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn create_store(config: &Config) -> Result<Arc<dyn OrderStore>, Box<dyn std::error::Error>> {
    if config.store_type == "memory" {
        return memory_store(config).await;
    }

    let dataset = match &config.sanity_dataset {
        Some(dataset) => dataset,
        None => {
            tracing::warn!("SANITY_DATASET not set, falling back to in-memory orders");
            return memory_store(config).await;
        }
    };

    let store = match (&config.sanity_api_host, &config.sanity_project_id) {
        (Some(host), _) => SanityStore::with_host(
            host,
            dataset,
            &config.sanity_api_version,
            config.sanity_api_token.as_deref(),
        ),
        (None, Some(project_id)) => SanityStore::new(
            project_id,
            dataset,
            &config.sanity_api_version,
            config.sanity_api_token.as_deref(),
        ),
        (None, None) => {
            tracing::warn!("SANITY_PROJECT_ID not set, falling back to in-memory orders");
            return memory_store(config).await;
        }
    };

    if config.sanity_api_token.is_none() {
        tracing::warn!("SANITY_API_TOKEN not set - order updates and deletes will fail");
    }
    tracing::info!("Using Sanity order store (dataset {})", dataset);

    Ok(Arc::new(store))
}

async fn memory_store(config: &Config) -> Result<Arc<dyn OrderStore>, Box<dyn std::error::Error>> {
    let store = match &config.memory_seed_file {
        Some(path) => {
            let store = MemoryStore::from_seed_file(path).await?;
            tracing::info!("Loaded in-memory orders from {}", path);
            store
        }
        None => MemoryStore::default(),
    };
    tracing::warn!("Using in-memory order store - changes are not persisted");

    Ok(Arc::new(store))
}
