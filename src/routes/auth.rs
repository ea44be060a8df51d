use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::evaluate_admission;
use crate::middleware::login_rate_limit;
use crate::models::{Admission, AuthorizationSource};
use crate::routes::AppState;

pub const ADMIN_HOME: &str = "/gallium/";
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Loading,
    Authorized,
    Unauthorized,
}

#[derive(Serialize)]
pub struct AdmissionResponse {
    pub state: GateState,
    pub identity_loaded: bool,
    pub identity_authorized: bool,
    pub local_password_authorized: bool,
    pub is_authorized: bool,
    pub source: Option<AuthorizationSource>,
    pub redirect: Option<&'static str>,
}

#[derive(Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let password = Router::new()
        .route("/auth/password", post(password_login))
        .layer(middleware::from_fn_with_state(state, login_rate_limit));

    Router::new()
        .route("/auth/config", get(auth_config))
        .route("/auth/admission", get(admission))
        .route("/auth/logout", post(logout))
        .merge(password)
}

async fn auth_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "clerk_publishable_key": state.config.clerk_publishable_key }))
}

async fn admission(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match evaluate_admission(&state, &headers).await {
        Ok((admission_state, admission)) => {
            let gate_state = match admission {
                Admission::Loading => GateState::Loading,
                Admission::Granted(_) => GateState::Authorized,
                Admission::Denied => GateState::Unauthorized,
            };

            Json(AdmissionResponse {
                state: gate_state,
                identity_loaded: admission_state.identity_loaded,
                identity_authorized: admission_state.identity_authorized,
                local_password_authorized: admission_state.local_password_authorized,
                is_authorized: admission.is_authorized(),
                redirect: admission.is_authorized().then_some(ADMIN_HOME),
                source: admission.source().cloned(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("Admission decision failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": GENERIC_FAILURE }))).into_response()
        }
    }
}

async fn password_login(
    State(state): State<AppState>,
    Json(payload): Json<PasswordRequest>,
) -> AppResult<Response> {
    if let Err(e) = state.gate.check_password(&payload.password) {
        tracing::warn!("Rejected admin password attempt");
        return Ok((StatusCode::UNAUTHORIZED, Json(json!({ "error": e.to_string() }))).into_response());
    }

    let cookie = state.admin_flag.set_cookie()?;
    tracing::info!("Admin signed in with password");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "authorized": true, "redirect": ADMIN_HOME })),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    // Clerk sign-out happens in the browser; this only drops the password flag.
    (
        [(header::SET_COOKIE, state.admin_flag.clear_cookie())],
        Json(json!({ "success": true })),
    )
}
