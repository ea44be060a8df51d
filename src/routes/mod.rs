pub mod admin;
pub mod auth;

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::dashboard::BoardRegistry;
use crate::models::AdmissionGate;
use crate::services::{AdminFlagSigner, IdentityResolver, RateLimiter};
use crate::storage::OrderStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn OrderStore>,
    pub boards: BoardRegistry,
    pub gate: AdmissionGate,
    pub identity: IdentityResolver,
    pub admin_flag: AdminFlagSigner,
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn OrderStore>,
        identity: IdentityResolver,
        rate_limiter: Option<RateLimiter>,
    ) -> Self {
        Self {
            boards: BoardRegistry::new(store.clone()).with_limits(
                Duration::from_secs(config.board_idle_minutes * 60),
                config.max_boards,
            ),
            gate: AdmissionGate::new(&config.admin_email, &config.admin_password),
            admin_flag: AdminFlagSigner::new(
                &config.session_secret,
                config.base_url.starts_with("https://"),
            ),
            config,
            store,
            identity,
            rate_limiter,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new().merge(auth::routes(state.clone()));
    let admin_routes = admin::routes(state.clone());

    Router::new()
        .nest("/api", public_routes)
        .merge(admin::home(state.clone()))
        .nest("/gallium", admin_routes)
        .fallback_service(
            ServeDir::new("static/public").fallback(ServeFile::new("static/public/index.html"))
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::dashboard::board::tests::order;
    use crate::services::{ClerkService, JwksVerifier};
    use crate::storage::MemoryStore;

    fn app_with(store: MemoryStore) -> Router {
        let config = Config::for_tests();
        let identity = IdentityResolver::new(
            JwksVerifier::new(&config.clerk_jwks_url),
            ClerkService::new(&config.clerk_api_url, &config.clerk_secret_key),
        );
        create_router(AppState::new(config, Arc::new(store), identity, None))
    }

    fn sample_store() -> MemoryStore {
        MemoryStore::new(vec![order("A", "pending", 10.0), order("B", "success", 20.0)])
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router) -> String {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/password", None, json!({ "password": "hunter2" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = body_json(resp).await;
        assert_eq!(body["redirect"], "/gallium/");

        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn admin_api_requires_admission() {
        let app = app_with(sample_store());

        let resp = app.oneshot(get("/gallium/api/orders", None)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_page_redirects_to_gate() {
        let app = app_with(sample_store());
        let req = Request::builder()
            .uri("/gallium/")
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn admin_home_is_served_after_admission() {
        let app = app_with(sample_store());
        let cookie = login(&app).await;
        let req = Request::builder()
            .uri("/gallium/")
            .header(header::ACCEPT, "text/html")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.contains("SHOP.CO Orders"));
        assert!(page.contains("<th>Order ID</th>"));
        assert!(page.contains("/clerk.js"));
    }

    #[tokio::test]
    async fn public_pages_never_include_dashboard() {
        let app = app_with(sample_store());

        for uri in ["/", "/gallium/index.html", "/gallium/app.js"] {
            let req = Request::builder()
                .uri(uri)
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            assert!(
                !String::from_utf8_lossy(&bytes).contains("SHOP.CO Orders"),
                "{} leaked the dashboard ({})",
                uri,
                status
            );
        }

        let resp = app.clone().oneshot(get("/", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.contains("Admin sign-in"));
        assert!(page.contains("Sign Out With Clerk"));

        let resp = app.oneshot(get("/clerk.js", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("clerk.signOut()"));
    }

    #[tokio::test]
    async fn forged_flag_is_not_admitted() {
        let app = app_with(sample_store());

        let resp = app
            .oneshot(get("/gallium/api/orders", Some("isAdmin=true")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_reported_inline() {
        let app = app_with(sample_store());

        let resp = app
            .oneshot(json_request("POST", "/api/auth/password", None, json!({ "password": "nope" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(
            body_json(resp).await["error"],
            "Incorrect password. Please try again."
        );
    }

    #[tokio::test]
    async fn admission_reports_each_channel() {
        let app = app_with(sample_store());

        let resp = app.clone().oneshot(get("/api/auth/admission", None)).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["state"], "unauthorized");
        assert_eq!(body["is_authorized"], false);
        assert!(body["redirect"].is_null());

        let resp = app
            .clone()
            .oneshot(get("/api/auth/admission", Some("__client_uat=1739000000")))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["state"], "loading");

        let cookie = login(&app).await;
        let resp = app.oneshot(get("/api/auth/admission", Some(&cookie))).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["state"], "authorized");
        assert_eq!(body["local_password_authorized"], true);
        assert_eq!(body["identity_authorized"], false);
        assert_eq!(body["source"]["kind"], "local_secret");
        assert_eq!(body["redirect"], "/gallium/");
    }

    #[tokio::test]
    async fn logout_clears_flag() {
        let app = app_with(sample_store());

        let resp = app
            .oneshot(json_request("POST", "/api/auth/logout", None, json!({})))
            .await
            .unwrap();

        let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn intermediary_patches_and_deletes() {
        let store = sample_store();
        let app = app_with(store.clone());
        let cookie = login(&app).await;

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/gallium/api/orders/A/status",
                Some(&cookie),
                json!({ "status": "dispatched" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(store.list_orders().await.unwrap()[0].status, "dispatched");

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/gallium/api/orders/A/status",
                Some(&cookie),
                json!({ "status": "dispatch" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .clone()
            .oneshot(json_request("DELETE", "/gallium/api/orders/B", Some(&cookie), json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(get("/gallium/api/orders/summary", Some(&cookie)))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["dispatched"], 1);
        assert_eq!(body["success"], 0);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn board_flow_over_http() {
        let store = sample_store();
        let app = app_with(store.clone());
        let cookie = login(&app).await;

        let resp = app
            .clone()
            .oneshot(json_request("POST", "/gallium/api/boards", Some(&cookie), json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let mounted = body_json(resp).await;
        let board = mounted["board_id"].as_str().unwrap().to_string();
        assert_eq!(mounted["view"]["rows"].as_array().unwrap().len(), 2);
        assert_eq!(mounted["view"]["summary"]["pending"], 1);

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/gallium/api/boards/{}/filter", board),
                Some(&cookie),
                json!({ "filter": "pending" }),
            ))
            .await
            .unwrap();
        let view = body_json(resp).await;
        assert_eq!(view["filter"], "pending");
        assert_eq!(view["rows"][0]["_id"], "A");
        assert_eq!(view["rows"].as_array().unwrap().len(), 1);

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/gallium/api/boards/{}/orders/A/complete", board),
                Some(&cookie),
                json!({}),
            ))
            .await
            .unwrap();
        let update = body_json(resp).await;
        assert_eq!(update["notice"]["title"], "Updated!");
        assert_eq!(update["notice"]["message"], "Order status changed to success.");
        assert!(update["view"]["rows"].as_array().unwrap().is_empty());
        assert_eq!(update["view"]["summary"]["success"], 2);

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/gallium/api/boards/{}/orders/B/delete", board),
                Some(&cookie),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["confirm_label"], "Yes, delete it!");

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/gallium/api/boards/{}/delete", board),
                Some(&cookie),
                json!({ "confirmed": false }),
            ))
            .await
            .unwrap();
        let update = body_json(resp).await;
        assert!(update["notice"].is_null());
        assert_eq!(store.list_orders().await.unwrap().len(), 2);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/gallium/api/boards/{}", board))
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(get(&format!("/gallium/api/boards/{}", board), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
