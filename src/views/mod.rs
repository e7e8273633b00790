//! Presentation state for the operator console.

pub mod order_detail;
pub mod pagination;

pub use order_detail::{AdvanceEvent, OrderDetailView};
pub use pagination::Page;
