use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dashboard::{BoardView, Confirmation, DeletePrompt, Notice, StatusFilter};
use crate::error::{AppError, AppResult};
use crate::models::OrderStatus;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct MountedBoard {
    pub board_id: Uuid,
    pub view: BoardView,
    pub notice: Option<Notice>,
}

#[derive(Serialize)]
pub struct BoardUpdate {
    pub view: BoardView,
    pub notice: Option<Notice>,
}

#[derive(Deserialize)]
pub struct FilterRequest {
    pub filter: StatusFilter,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub confirmed: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/boards", post(mount))
        .route("/boards/{board}", get(view).delete(unmount))
        .route("/boards/{board}/filter", put(set_filter))
        .route("/boards/{board}/expand/{order}", post(toggle_expanded))
        .route("/boards/{board}/orders/{order}/status", put(update_status))
        .route("/boards/{board}/orders/{order}/complete", post(complete))
        .route("/boards/{board}/orders/{order}/delete", post(request_delete))
        .route("/boards/{board}/delete", post(resolve_delete))
}

async fn mount(State(state): State<AppState>) -> (StatusCode, Json<MountedBoard>) {
    let (board_id, view, notice) = state.boards.mount().await;
    (
        StatusCode::CREATED,
        Json(MountedBoard {
            board_id,
            view,
            notice,
        }),
    )
}

async fn view(State(state): State<AppState>, Path(board): Path<Uuid>) -> AppResult<Json<BoardView>> {
    Ok(Json(state.boards.view(board).await?))
}

async fn unmount(State(state): State<AppState>, Path(board): Path<Uuid>) -> AppResult<StatusCode> {
    if state.boards.unmount(board).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Board not found".to_string()))
    }
}

async fn set_filter(
    State(state): State<AppState>,
    Path(board): Path<Uuid>,
    Json(payload): Json<FilterRequest>,
) -> AppResult<Json<BoardView>> {
    Ok(Json(state.boards.set_filter(board, payload.filter).await?))
}

async fn toggle_expanded(
    State(state): State<AppState>,
    Path((board, order)): Path<(Uuid, String)>,
) -> AppResult<Json<BoardView>> {
    Ok(Json(state.boards.toggle_expanded(board, &order).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path((board, order)): Path<(Uuid, String)>,
    Json(payload): Json<StatusRequest>,
) -> AppResult<Json<BoardUpdate>> {
    let (view, notice) = state.boards.update_status(board, &order, payload.status).await?;
    Ok(Json(BoardUpdate {
        view,
        notice: Some(notice),
    }))
}

/// The row's check action: mark the order successful.
async fn complete(
    State(state): State<AppState>,
    Path((board, order)): Path<(Uuid, String)>,
) -> AppResult<Json<BoardUpdate>> {
    let (view, notice) = state
        .boards
        .update_status(board, &order, OrderStatus::Success)
        .await?;
    Ok(Json(BoardUpdate {
        view,
        notice: Some(notice),
    }))
}

async fn request_delete(
    State(state): State<AppState>,
    Path((board, order)): Path<(Uuid, String)>,
) -> AppResult<Json<DeletePrompt>> {
    Ok(Json(state.boards.request_delete(board, &order).await?))
}

async fn resolve_delete(
    State(state): State<AppState>,
    Path(board): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> AppResult<Json<BoardUpdate>> {
    let (view, notice) = state
        .boards
        .resolve_delete(board, Confirmation::from(payload.confirmed))
        .await?;
    Ok(Json(BoardUpdate { view, notice }))
}
