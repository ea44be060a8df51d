pub mod board;
pub mod notice;
pub mod registry;

pub use board::{BoardView, Confirmation, StatusFilter, SummaryCounts};
pub use notice::{DeletePrompt, Notice};
pub use registry::BoardRegistry;
