// Roastery Admin Library - operator console for the roastery back office
// This exposes the core components for testing and integration

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod fs;
pub mod observability;
pub mod session;
pub mod telemetry;
pub mod views;
pub mod workflows;

// Re-export key types for easy access
pub use api::{
    classify, sign_in, ApiClient, ApiError, AuthApi, ClassifiedError, ErrorKind, InventoryApi,
    LoginError, OperatorRole, Order, OrdersApi, Resource,
};
pub use cache::{QueryCache, QueryKey};
pub use config::{config, init_config, RoasteryConfig};
pub use observability::{api_metrics, ApiMetrics, ApiStats};
pub use session::{Session, SessionError, SessionStore};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
pub use views::{AdvanceEvent, OrderDetailView, Page};
pub use workflows::{
    next_status, AdvanceOutcome, CatalogService, ConfirmationEvent, ConfirmationFlow,
    OrderStatus, OrderStatusWorkflow, SkipReason, STATUS_FLOW,
};
