use axum::{
    extract::{Extension, Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::dashboard::SummaryCounts;
use crate::error::{AppError, AppResult};
use crate::middleware::AdminPrincipal;
use crate::models::{Order, OrderStatus};
use crate::routes::AppState;
use crate::storage::StoreError;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct StatusUpdated {
    pub id: String,
    pub status: OrderStatus,
}

#[derive(Serialize)]
pub struct OrderDeleted {
    pub id: String,
    pub deleted: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/summary", get(summary))
        .route("/orders/{id}/status", put(update_status))
        .route("/orders/{id}", delete(delete_order))
}

fn store_error(id: &str, e: StoreError) -> AppError {
    match e {
        StoreError::NotFound(_) => AppError::NotFound(format!("Order {} not found", id)),
        other => AppError::Store(other),
    }
}

async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    let orders = state.store.list_orders().await?;
    Ok(Json(orders))
}

async fn summary(State(state): State<AppState>) -> AppResult<Json<SummaryCounts>> {
    let orders = state.store.list_orders().await?;
    Ok(Json(SummaryCounts::from_orders(&orders)))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<StatusUpdated>> {
    let status = OrderStatus::from_str(&payload.status)
        .filter(|s| s.as_str() == payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;

    state
        .store
        .set_status(&id, status)
        .await
        .map_err(|e| store_error(&id, e))?;

    tracing::info!("Order {} status set to {} by {:?}", id, status, principal.source);
    Ok(Json(StatusUpdated { id, status }))
}

async fn delete_order(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDeleted>> {
    state
        .store
        .delete_order(&id)
        .await
        .map_err(|e| store_error(&id, e))?;

    tracing::info!("Order {} deleted by {:?}", id, principal.source);
    Ok(Json(OrderDeleted { id, deleted: true }))
}
