pub mod admin_flag;
pub mod clerk;
pub mod identity;
pub mod jwks;
pub mod rate_limiter;

pub use admin_flag::AdminFlagSigner;
pub use clerk::ClerkService;
pub use identity::IdentityResolver;
pub use jwks::JwksVerifier;
pub use rate_limiter::RateLimiter;
