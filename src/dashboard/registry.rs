use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::board::{BoardView, Confirmation, OrderBoard, StatusFilter};
use super::notice::{DeletePrompt, Notice};
use crate::error::{AppError, AppResult};
use crate::models::OrderStatus;
use crate::storage::OrderStore;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_BOARDS: usize = 256;

struct MountedBoard {
    board: OrderBoard,
    last_seen: Instant,
}

/// Mounted dashboards, keyed by board id.
///
/// Store calls run without the lock held. Their results are reconciled only
/// if the board is still mounted; a board unmounted in the meantime is left
/// gone and the result is dropped.
///
/// Boards untouched for `idle_ttl` are evicted on the next mount, and the
/// least recently used board goes first once `max_boards` is reached.
#[derive(Clone)]
pub struct BoardRegistry {
    store: Arc<dyn OrderStore>,
    boards: Arc<RwLock<HashMap<Uuid, MountedBoard>>>,
    idle_ttl: Duration,
    max_boards: usize,
}

fn board_not_found() -> AppError {
    AppError::NotFound("Board not found".to_string())
}

fn order_not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}

impl BoardRegistry {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            boards: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl: DEFAULT_IDLE_TTL,
            max_boards: DEFAULT_MAX_BOARDS,
        }
    }

    pub fn with_limits(mut self, idle_ttl: Duration, max_boards: usize) -> Self {
        self.idle_ttl = idle_ttl;
        self.max_boards = max_boards.max(1);
        self
    }

    /// Creates a board and runs its single initial load.
    pub async fn mount(&self) -> (Uuid, BoardView, Option<Notice>) {
        let mut board = OrderBoard::new();
        let notice = board.load(self.store.as_ref()).await;
        let view = board.view();

        let id = Uuid::new_v4();
        let mut boards = self.boards.write().await;
        self.evict(&mut boards);
        boards.insert(
            id,
            MountedBoard {
                board,
                last_seen: Instant::now(),
            },
        );
        tracing::debug!("Mounted board {} with {} orders", id, view.summary.total);

        (id, view, notice)
    }

    /// Drops idle boards, then the least recently used ones until there is
    /// room for one more.
    fn evict(&self, boards: &mut HashMap<Uuid, MountedBoard>) {
        let before = boards.len();
        boards.retain(|_, mounted| mounted.last_seen.elapsed() < self.idle_ttl);

        while boards.len() >= self.max_boards {
            let Some(oldest) = boards
                .iter()
                .min_by_key(|(_, mounted)| mounted.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            boards.remove(&oldest);
        }

        let evicted = before - boards.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} stale boards", evicted);
        }
    }

    pub async fn unmount(&self, id: Uuid) -> bool {
        let removed = self.boards.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!("Unmounted board {}", id);
        }
        removed
    }

    pub async fn view(&self, id: Uuid) -> AppResult<BoardView> {
        self.with_board(id, |board| board.view()).await
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.boards.read().await.len()
    }

    async fn with_board<T>(&self, id: Uuid, f: impl FnOnce(&mut OrderBoard) -> T) -> AppResult<T> {
        let mut boards = self.boards.write().await;
        let mounted = boards.get_mut(&id).ok_or_else(board_not_found)?;
        mounted.last_seen = Instant::now();
        Ok(f(&mut mounted.board))
    }

    pub async fn set_filter(&self, id: Uuid, filter: StatusFilter) -> AppResult<BoardView> {
        self.with_board(id, |board| {
            board.set_filter(filter);
            board.view()
        })
        .await
    }

    pub async fn toggle_expanded(&self, id: Uuid, order_id: &str) -> AppResult<BoardView> {
        self.with_board(id, |board| {
            board.toggle_expanded(order_id);
            board.view()
        })
        .await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        order_id: &str,
        status: OrderStatus,
    ) -> AppResult<(BoardView, Notice)> {
        if !self.with_board(id, |board| board.contains(order_id)).await? {
            return Err(order_not_found());
        }

        let result = self.store.set_status(order_id, status).await;

        self.with_board(id, |board| {
            let notice = board.apply_status(order_id, status, result);
            (board.view(), notice)
        })
        .await
        .inspect_err(|_| tracing::debug!("Board {} unmounted before status update settled", id))
    }

    pub async fn request_delete(&self, id: Uuid, order_id: &str) -> AppResult<DeletePrompt> {
        self.with_board(id, |board| board.request_delete(order_id))
            .await?
            .ok_or_else(order_not_found)
    }

    pub async fn resolve_delete(
        &self,
        id: Uuid,
        decision: Confirmation,
    ) -> AppResult<(BoardView, Option<Notice>)> {
        let target = self
            .with_board(id, |board| board.resolve_confirmation(decision))
            .await?;

        let Some(order_id) = target else {
            return Ok((self.view(id).await?, None));
        };

        let result = self.store.delete_order(&order_id).await;

        self.with_board(id, |board| {
            let notice = board.apply_delete(&order_id, result);
            (board.view(), Some(notice))
        })
        .await
        .inspect_err(|_| tracing::debug!("Board {} unmounted before delete settled", id))
    }
}
