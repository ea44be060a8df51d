use std::env;

#[derive(Clone)]
pub struct Config {
    pub admin_password: String,
    pub admin_email: String,
    pub session_secret: String,
    pub store_type: String,
    pub memory_seed_file: Option<String>,
    pub sanity_project_id: Option<String>,
    pub sanity_dataset: Option<String>,
    pub sanity_api_version: String,
    pub sanity_api_token: Option<String>,
    pub sanity_api_host: Option<String>,
    pub clerk_secret_key: String,
    pub clerk_publishable_key: String,
    pub clerk_jwks_url: String,
    pub clerk_api_url: String,
    pub upstash_redis_url: Option<String>,
    pub rate_limit_login: u32,
    pub board_idle_minutes: u64,
    pub max_boards: usize,
    pub base_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            admin_password: env::var("ADMIN_PASSWORD")?,
            admin_email: env::var("ADMIN_EMAIL")?,
            session_secret: env::var("SESSION_SECRET")?,
            store_type: env::var("STORE_TYPE").unwrap_or_else(|_| "sanity".to_string()),
            memory_seed_file: env::var("MEMORY_SEED_FILE").ok(),
            sanity_project_id: env::var("SANITY_PROJECT_ID").ok(),
            sanity_dataset: env::var("SANITY_DATASET").ok(),
            sanity_api_version: env::var("SANITY_API_VERSION")
                .unwrap_or_else(|_| "2025-02-05".to_string()),
            sanity_api_token: env::var("SANITY_API_TOKEN").ok(),
            sanity_api_host: env::var("SANITY_API_HOST").ok(),
            clerk_secret_key: env::var("CLERK_SECRET_KEY")?,
            clerk_publishable_key: env::var("CLERK_PUBLISHABLE_KEY")?,
            clerk_jwks_url: env::var("CLERK_JWKS_URL")?,
            clerk_api_url: env::var("CLERK_API_URL")
                .unwrap_or_else(|_| "https://api.clerk.com".to_string()),
            upstash_redis_url: env::var("UPSTASH_REDIS_URL").ok(),
            rate_limit_login: env::var("RATE_LIMIT_LOGIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            board_idle_minutes: env::var("BOARD_IDLE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            max_boards: env::var("MAX_BOARDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }

    /// Config with fixed values, used by the router tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            admin_password: "hunter2".to_string(),
            admin_email: "owner@shop.co".to_string(),
            session_secret: "test-session-secret".to_string(),
            store_type: "memory".to_string(),
            memory_seed_file: None,
            sanity_project_id: None,
            sanity_dataset: None,
            sanity_api_version: "2025-02-05".to_string(),
            sanity_api_token: None,
            sanity_api_host: None,
            clerk_secret_key: "sk_test".to_string(),
            clerk_publishable_key: "pk_test".to_string(),
            clerk_jwks_url: "http://127.0.0.1:9/.well-known/jwks.json".to_string(),
            clerk_api_url: "http://127.0.0.1:9".to_string(),
            upstash_redis_url: None,
            rate_limit_login: 10,
            board_idle_minutes: 30,
            max_boards: 256,
            base_url: "http://localhost:3000".to_string(),
            port: 3000,
        }
    }
}
