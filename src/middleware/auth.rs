use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::error::AppResult;
use crate::models::{Admission, AdmissionState, AuthorizationSource};
use crate::routes::AppState;

/// The admitted caller, available to admin handlers as an extension.
#[derive(Debug, Clone)]
pub struct AdminPrincipal {
    pub source: AuthorizationSource,
}

/// Runs one gate evaluation: the live identity plus the persisted password
/// flag, read fresh on every request.
pub async fn evaluate_admission(
    state: &AppState,
    headers: &HeaderMap,
) -> AppResult<(AdmissionState, Admission)> {
    let identity = state.identity.resolve(headers).await?;
    let local_flag = state.admin_flag.is_set(headers);

    Ok((
        state.gate.state(&identity, local_flag),
        state.gate.resolve(&identity, local_flag),
    ))
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn reject(html: bool, status: StatusCode, message: &str) -> Response {
    if html {
        Redirect::to("/").into_response()
    } else {
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let html = wants_html(req.headers());

    match evaluate_admission(&state, req.headers()).await {
        Ok((_, Admission::Granted(source))) => {
            tracing::debug!("Admitted admin request via {:?}", source);
            req.extensions_mut().insert(AdminPrincipal { source });
            next.run(req).await
        }
        Ok((_, Admission::Loading)) => {
            reject(html, StatusCode::UNAUTHORIZED, "Authentication pending")
        }
        Ok((_, Admission::Denied)) => {
            reject(html, StatusCode::UNAUTHORIZED, "Authentication required")
        }
        Err(e) => {
            tracing::error!("Admission check failed: {}", e);
            reject(html, StatusCode::BAD_GATEWAY, "Unable to verify session")
        }
    }
}
