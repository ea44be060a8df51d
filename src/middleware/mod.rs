pub mod auth;
pub mod rate_limit;

pub use auth::{require_admin, AdminPrincipal};
pub use rate_limit::login_rate_limit;
