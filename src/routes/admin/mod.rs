pub mod board;
pub mod orders;

use axum::{middleware, Router};
use tower_http::services::{ServeDir, ServeFile};

use crate::middleware::require_admin;
use crate::routes::AppState;

const ADMIN_STATIC_DIR: &str = "static/gallium";

pub fn routes(state: AppState) -> Router<AppState> {
    let api_routes = Router::new()
        .merge(orders::routes())
        .merge(board::routes());

    // Auth covers the whole admin router, API and static files alike.
    Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(ADMIN_STATIC_DIR))
        .layer(middleware::from_fn_with_state(state, require_admin))
}

/// `/gallium/` is not matched by the `/gallium` nest, so the admin home gets
/// its own gated route at the top level.
pub fn home(state: AppState) -> Router<AppState> {
    Router::new()
        .route_service(
            "/gallium/",
            ServeFile::new(format!("{}/index.html", ADMIN_STATIC_DIR)),
        )
        .layer(middleware::from_fn_with_state(state, require_admin))
}
