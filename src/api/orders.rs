use crate::api::client::{ApiClient, Auth};
use crate::api::errors::ApiError;
use crate::api::types::{Order, OrderQuery, OrderStatus};
use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

/// Order endpoints the status workflow depends on.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ApiError>;

    async fn fetch_order(&self, order_id: &str) -> Result<Order, ApiError>;

    /// Ask the server to move the order to `next`. Returns the server's
    /// status token; the caller must re-read the order to learn the result.
    async fn advance_order_status(&self, order_id: &str, next: OrderStatus) -> Result<String, ApiError>;
}

/// Path verb for each advance target. Only forward steps have one.
pub fn advance_verb(next: OrderStatus) -> Option<&'static str> {
    match next {
        OrderStatus::Roasting => Some("roast"),
        OrderStatus::Shipped => Some("ship"),
        OrderStatus::Complete => Some("complete"),
        OrderStatus::Confirm | OrderStatus::Cancelled => None,
    }
}

#[async_trait]
impl OrdersApi for ApiClient {
    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ApiError> {
        self.get("orders", &query.to_pairs()).await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.get(&format!("orders/{order_id}"), &[]).await
    }

    async fn advance_order_status(&self, order_id: &str, next: OrderStatus) -> Result<String, ApiError> {
        let verb = advance_verb(next).ok_or_else(|| {
            ApiError::InvalidRequest(format!("orders cannot be advanced to '{next}'"))
        })?;

        info!(order_id = %order_id, next = %next, "Requesting order status change");
        let request = self.request(Method::PATCH, &format!("orders/{order_id}/{verb}"))?;
        self.send(request, Auth::Bearer).await
    }
}
