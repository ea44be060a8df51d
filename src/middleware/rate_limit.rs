use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::routes::AppState;
use crate::services::rate_limiter::WINDOW_SECONDS;

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Limits password attempts per client IP when Upstash Redis is configured.
pub async fn login_rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ref rate_limiter) = state.rate_limiter {
        let ip = client_ip(req.headers());
        match rate_limiter.check("login", &ip).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Login rate limit exceeded for IP: {}", ip);
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": "Too many login attempts. Please wait and try again.",
                        "retry_after": WINDOW_SECONDS
                    })),
                )
                    .into_response();
            }
            Err(e) => {
                // Fail open: the password check still applies.
                tracing::error!("Rate limiter error: {} - allowing request", e);
            }
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers), "10.0.0.2");
    }
}
