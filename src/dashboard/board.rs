use serde::{Deserialize, Serialize};

use super::notice::{DeletePrompt, Notice};
use crate::models::{Order, OrderStatus};
use crate::storage::{OrderStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Filter buttons in display order.
    pub const OPTIONS: [&'static str; 4] = ["All", "pending", "success", "dispatched"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "All" => Some(StatusFilter::All),
            other => OrderStatus::from_str(other).map(StatusFilter::Only),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.as_str(),
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => order.get_status() == Some(*status),
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StatusFilter::parse(&value).ok_or_else(|| format!("unknown status filter: {}", value))
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.as_str().to_string()
    }
}

/// Which order row shows its details. At most one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Expansion {
    #[default]
    Collapsed,
    Expanded(String),
}

impl Expansion {
    pub fn toggle(&mut self, order_id: &str) {
        *self = match self {
            Expansion::Expanded(current) if current == order_id => Expansion::Collapsed,
            _ => Expansion::Expanded(order_id.to_string()),
        };
    }

    pub fn is_expanded(&self, order_id: &str) -> bool {
        matches!(self, Expansion::Expanded(current) if current == order_id)
    }

    pub fn expanded_id(&self) -> Option<&str> {
        match self {
            Expansion::Expanded(id) => Some(id),
            Expansion::Collapsed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirm,
    Cancel,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirm
        } else {
            Confirmation::Cancel
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SummaryCounts {
    pub pending: usize,
    pub dispatched: usize,
    pub success: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub name: &'static str,
    pub value: usize,
}

impl SummaryCounts {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut counts = SummaryCounts {
            total: orders.len(),
            ..Default::default()
        };

        for order in orders {
            match order.get_status() {
                Some(OrderStatus::Pending) => counts.pending += 1,
                Some(OrderStatus::Dispatched) => counts.dispatched += 1,
                Some(OrderStatus::Success) => counts.success += 1,
                None => {}
            }
        }

        counts
    }

    pub fn count(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Dispatched => self.dispatched,
            OrderStatus::Success => self.success,
        }
    }

    /// Slices for the proportion chart.
    pub fn chart(&self) -> Vec<ChartSlice> {
        OrderStatus::ALL
            .iter()
            .map(|status| ChartSlice {
                name: status.label(),
                value: self.count(*status),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    #[serde(flatten)]
    pub order: Order,
    pub customer: String,
    pub display_total: String,
    pub display_order_date: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub filter: StatusFilter,
    pub filters: [&'static str; 4],
    pub expanded: Option<String>,
    pub rows: Vec<OrderRow>,
    pub summary: SummaryCounts,
    pub chart: Vec<ChartSlice>,
    pub pending_delete: Option<DeletePrompt>,
}

/// Local state behind one mounted dashboard: the order snapshot plus the
/// filter and row selection. The snapshot only changes after the store has
/// accepted a mutation.
#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    orders: Vec<Order>,
    filter: StatusFilter,
    expansion: Expansion,
    pending_delete: Option<String>,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[cfg(test)]
    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.orders.iter().any(|o| o.id == order_id)
    }

    pub async fn load(&mut self, store: &dyn OrderStore) -> Option<Notice> {
        let result = store.list_orders().await;
        self.apply_load(result)
    }

    pub fn apply_load(&mut self, result: Result<Vec<Order>, StoreError>) -> Option<Notice> {
        match result {
            Ok(orders) => {
                self.orders = orders;
                None
            }
            Err(e) => {
                tracing::error!("Error fetching orders: {}", e);
                Some(Notice::error("Failed to fetch orders."))
            }
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Orders passing the current filter, in snapshot order.
    pub fn filtered(&self) -> Vec<&Order> {
        self.orders.iter().filter(|o| self.filter.matches(o)).collect()
    }

    pub fn toggle_expanded(&mut self, order_id: &str) {
        self.expansion.toggle(order_id);
    }

    pub fn apply_status(
        &mut self,
        order_id: &str,
        status: OrderStatus,
        result: Result<(), StoreError>,
    ) -> Notice {
        match result {
            Ok(()) => {
                if let Some(order) = self.orders.iter_mut().find(|o| o.id == order_id) {
                    order.status = status.as_str().to_string();
                }
                Notice::success("Updated!", format!("Order status changed to {}.", status))
            }
            Err(e) => {
                tracing::error!("Error updating order status for {}: {}", order_id, e);
                Notice::error("Failed to update order status.")
            }
        }
    }

    /// Opens the confirmation step for deleting `order_id`. Returns `None`
    /// when the order is not on the board.
    pub fn request_delete(&mut self, order_id: &str) -> Option<DeletePrompt> {
        if !self.contains(order_id) {
            return None;
        }
        self.pending_delete = Some(order_id.to_string());
        Some(DeletePrompt::for_order(order_id))
    }

    /// Closes the confirmation step. Yields the order to delete only when
    /// the user confirmed.
    pub fn resolve_confirmation(&mut self, decision: Confirmation) -> Option<String> {
        let pending = self.pending_delete.take();
        match decision {
            Confirmation::Confirm => pending,
            Confirmation::Cancel => None,
        }
    }

    pub fn apply_delete(&mut self, order_id: &str, result: Result<(), StoreError>) -> Notice {
        match result {
            Ok(()) => {
                self.orders.retain(|o| o.id != order_id);
                if self.expansion.is_expanded(order_id) {
                    self.expansion = Expansion::Collapsed;
                }
                Notice::success("Deleted!", "Your order has been deleted.")
            }
            Err(e) => {
                tracing::error!("Error deleting order {}: {}", order_id, e);
                Notice::error("Failed to delete the order.")
            }
        }
    }

    /// Counts over the whole snapshot, regardless of the filter.
    pub fn summary_counts(&self) -> SummaryCounts {
        SummaryCounts::from_orders(&self.orders)
    }

    pub fn view(&self) -> BoardView {
        let rows = self
            .filtered()
            .into_iter()
            .map(|order| OrderRow {
                customer: order.customer_name(),
                display_total: order.display_total(),
                display_order_date: order.display_order_date(),
                expanded: self.expansion.is_expanded(&order.id),
                order: order.clone(),
            })
            .collect();
        let summary = self.summary_counts();

        BoardView {
            filter: self.filter,
            filters: StatusFilter::OPTIONS,
            expanded: self.expansion.expanded_id().map(|id| id.to_string()),
            rows,
            summary,
            chart: summary.chart(),
            pending_delete: self.pending_delete.as_deref().map(DeletePrompt::for_order),
        }
    }
}
