//! REST client for the roastery backend and its resource services.

pub mod auth;
pub mod client;
pub mod errors;
pub mod inventory;
pub mod orders;
pub mod types;

pub use auth::{sign_in, AuthApi, LoginError, OperatorRole};
pub use client::ApiClient;
pub use errors::{classify, ApiError, ClassifiedError, ErrorKind, Resource};
pub use inventory::{InventoryApi, ProductImage};
pub use orders::{advance_verb, OrdersApi};
pub use types::{
    Bean, Form, Order, OrderItem, OrderQuery, OrderStatus, Product, ProductMetadata, ProductQuery,
    Profile, SortOrder,
};

#[cfg(any(test, feature = "testing"))]
pub use auth::MockAuthApi;
#[cfg(any(test, feature = "testing"))]
pub use inventory::MockInventoryApi;
#[cfg(any(test, feature = "testing"))]
pub use orders::MockOrdersApi;
