pub mod memory;
pub mod sanity;
pub mod r#trait;

pub use memory::MemoryStore;
pub use r#trait::{OrderStore, StoreError};
pub use sanity::SanityStore;
