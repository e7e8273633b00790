// Order workflow modules
// The server owns order state; everything here only requests changes and re-reads.

pub mod advance;
pub mod catalog;
pub mod confirmation;
pub mod order_status;

pub use advance::{AdvanceOutcome, OrderStatusWorkflow, SkipReason, SUCCESS_NOTIFICATION};
pub use catalog::CatalogService;
pub use confirmation::{ConfirmationEvent, ConfirmationFlow};
pub use order_status::{next_status, OrderStatus, UnknownStatus, STATUS_FLOW};
