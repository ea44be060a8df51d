use axum::http::{header, HeaderMap};

use super::admin_flag::cookie_value;
use super::clerk::ClerkService;
use super::jwks::{JwksVerifier, TokenError};
use crate::error::{AppError, AppResult};
use crate::models::IdentitySnapshot;

const SESSION_COOKIE: &str = "__session";
const CLIENT_UAT_COOKIE: &str = "__client_uat";

/// Turns a request's Clerk credentials into an `IdentitySnapshot`.
#[derive(Clone)]
pub struct IdentityResolver {
    jwks: JwksVerifier,
    clerk: ClerkService,
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .or_else(|| cookie_value(headers, SESSION_COOKIE))
        .filter(|t| !t.is_empty())
}

/// Clerk sets `__client_uat` to a non-zero timestamp while the browser holds
/// a signed-in client.
fn client_signed_in(headers: &HeaderMap) -> bool {
    cookie_value(headers, CLIENT_UAT_COOKIE).is_some_and(|v| !v.is_empty() && v != "0")
}

impl IdentityResolver {
    pub fn new(jwks: JwksVerifier, clerk: ClerkService) -> Self {
        Self { jwks, clerk }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> AppResult<IdentitySnapshot> {
        let signed_in_client = client_signed_in(headers);

        let Some(token) = session_token(headers) else {
            // A signed-in client without a session token is mid-handshake.
            return Ok(if signed_in_client {
                IdentitySnapshot::loading()
            } else {
                IdentitySnapshot::signed_out()
            });
        };

        let claims = match self.jwks.verify_token(token).await {
            Ok(claims) => claims,
            Err(TokenError::Expired) if signed_in_client => {
                tracing::debug!("Session token expired, waiting for refresh");
                return Ok(IdentitySnapshot::loading());
            }
            Err(TokenError::Expired) => return Ok(IdentitySnapshot::signed_out()),
            Err(TokenError::Invalid(reason)) => {
                tracing::warn!("Rejected session token: {}", reason);
                return Ok(IdentitySnapshot::signed_out());
            }
            Err(e @ TokenError::KeysUnavailable(_)) => {
                return Err(AppError::ExternalService(e.to_string()));
            }
        };

        let user = self.clerk.get_user(&claims.sub).await?;
        let email = ClerkService::primary_verified_email(&user);
        tracing::debug!(
            "Resolved Clerk user {} ({})",
            user.id,
            ClerkService::get_full_name(&user).unwrap_or_default()
        );

        Ok(IdentitySnapshot::signed_in(email))
    }
}
