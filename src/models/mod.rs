pub mod admission;
pub mod order;

pub use admission::{Admission, AdmissionGate, AdmissionState, AuthorizationSource, IdentitySnapshot};
pub use order::{Order, OrderStatus};
