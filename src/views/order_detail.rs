//! State behind the order detail screen: the displayed order, the advance
//! control, and the notification or error shown after an advance.

use crate::api::{ClassifiedError, ErrorKind, OperatorRole, Order, OrdersApi};
use crate::workflows::{
    AdvanceOutcome, ConfirmationEvent, ConfirmationFlow, OrderStatus, OrderStatusWorkflow,
};
use tracing::{debug, warn};

const REREAD_FAILED: &str =
    "Order status updated, but the order could not be reloaded. Refresh to see its current status.";

/// Raised once an advance settles.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceEvent {
    Refreshed(Order),
    Failed(ClassifiedError),
}

pub struct OrderDetailView<A: ?Sized> {
    workflow: OrderStatusWorkflow<A>,
    order_id: String,
    role: OperatorRole,
    order: Option<Order>,
    confirmation: ConfirmationFlow,
    notification: Option<&'static str>,
    last_error: Option<ClassifiedError>,
}

impl<A: OrdersApi + ?Sized> OrderDetailView<A> {
    pub fn new(workflow: OrderStatusWorkflow<A>, order_id: impl Into<String>, role: OperatorRole) -> Self {
        Self {
            workflow,
            order_id: order_id.into(),
            role,
            order: None,
            confirmation: ConfirmationFlow::new(),
            notification: None,
            last_error: None,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn notification(&self) -> Option<&'static str> {
        self.notification
    }

    pub fn last_error(&self) -> Option<&ClassifiedError> {
        self.last_error.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Read-through load. On failure the previously displayed order stays.
    pub async fn load(&mut self) -> Result<&Order, ClassifiedError> {
        match self.workflow.fetch_order(&self.order_id).await {
            Ok(order) => {
                self.last_error = None;
                Ok(&*self.order.insert(order))
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn is_pending(&self) -> bool {
        self.confirmation.is_pending() || self.workflow.is_pending(&self.order_id)
    }

    fn current_status(&self) -> Option<OrderStatus> {
        self.order.as_ref().map(|order| order.status)
    }

    pub fn next_status_label(&self) -> String {
        if self.is_pending() {
            return "Updating...".to_string();
        }
        match self.current_status() {
            None => "Loading...".to_string(),
            Some(OrderStatus::Complete) => "Completed".to_string(),
            Some(OrderStatus::Cancelled) => "Cancelled".to_string(),
            Some(status) => match status.next() {
                Some(next) => format!("Next: {}", next.label()),
                None => status.label().to_string(),
            },
        }
    }

    pub fn can_advance(&self) -> bool {
        let Some(status) = self.current_status() else {
            return false;
        };
        !status.is_terminal() && !self.is_pending() && self.role.can_advance_orders()
    }

    /// Open the confirmation prompt. Returns the status that would be
    /// requested, or `None` when the control is disabled.
    pub fn begin_advance(&mut self) -> Option<OrderStatus> {
        if !self.can_advance() {
            return None;
        }
        let current = self.current_status()?;
        self.confirmation
            .handle(ConfirmationEvent::Request { current });
        self.confirmation.target()
    }

    pub fn cancel_advance(&mut self) {
        self.confirmation.handle(ConfirmationEvent::Cancel);
    }

    /// Commit the pending confirmation. Returns `None` when nothing was
    /// awaiting confirmation or the workflow skipped the request.
    pub async fn confirm_advance(&mut self) -> Option<AdvanceEvent> {
        if !self.confirmation.is_confirming() {
            debug!(order_id = %self.order_id, "No advance awaiting confirmation");
            return None;
        }
        let current = self.current_status()?;
        self.confirmation.handle(ConfirmationEvent::Confirm);

        let result = self.workflow.request_advance(&self.order_id, current).await;
        match result {
            Ok(AdvanceOutcome::Advanced {
                order: Some(order),
                notification,
                ..
            }) => {
                self.confirmation.handle(ConfirmationEvent::Completed);
                self.notification = Some(notification);
                self.last_error = None;
                self.order = Some(order.clone());
                Some(AdvanceEvent::Refreshed(order))
            }
            Ok(AdvanceOutcome::Advanced {
                order: None,
                notification,
                ..
            }) => {
                self.confirmation.handle(ConfirmationEvent::Completed);
                self.notification = Some(notification);
                let error = ClassifiedError {
                    kind: ErrorKind::Unknown,
                    message: REREAD_FAILED.to_string(),
                };
                self.last_error = Some(error.clone());
                Some(AdvanceEvent::Failed(error))
            }
            Ok(AdvanceOutcome::Skipped(reason)) => {
                debug!(order_id = %self.order_id, ?reason, "Advance skipped");
                self.confirmation.handle(ConfirmationEvent::Failed);
                None
            }
            Err(e) => {
                warn!(order_id = %self.order_id, kind = ?e.kind, "Advance failed");
                self.confirmation.handle(ConfirmationEvent::Failed);
                self.last_error = Some(e.clone());
                Some(AdvanceEvent::Failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockOrdersApi};
    use crate::cache::QueryCache;
    use std::sync::Arc;
    use std::time::Duration;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: "7".to_string(),
            customer_email: "user@test.com".to_string(),
            customer_name: "user".to_string(),
            street: "Jl. Kopi 1".to_string(),
            city: "Bandung".to_string(),
            phone_number: "0812".to_string(),
            alternative_phone_number: None,
            items: Vec::new(),
            total_price: 300.0,
            created_at: chrono::Utc::now(),
            status,
        }
    }

    fn view(api: MockOrdersApi, role: OperatorRole) -> OrderDetailView<MockOrdersApi> {
        let cache = QueryCache::new(100, Duration::from_secs(60));
        OrderDetailView::new(OrderStatusWorkflow::new(Arc::new(api), cache), "7", role)
    }

    #[tokio::test]
    async fn test_confirm_advances_and_shows_refetched_order() {
        let mut api = MockOrdersApi::new();
        let mut reads = 0;
        api.expect_fetch_order().times(2).returning(move |_| {
            reads += 1;
            Ok(order(if reads == 1 {
                OrderStatus::Confirm
            } else {
                OrderStatus::Roasting
            }))
        });
        api.expect_advance_order_status()
            .withf(|id, next| id == "7" && *next == OrderStatus::Roasting)
            .times(1)
            .returning(|_, _| Ok("roasting".to_string()));

        let mut view = view(api, OperatorRole::SuperAdmin);
        view.load().await.unwrap();
        assert_eq!(view.next_status_label(), "Next: Roasting");
        assert!(view.can_advance());

        assert_eq!(view.begin_advance(), Some(OrderStatus::Roasting));
        let event = view.confirm_advance().await;

        assert!(matches!(event, Some(AdvanceEvent::Refreshed(ref o)) if o.status == OrderStatus::Roasting));
        assert_eq!(view.order().unwrap().status, OrderStatus::Roasting);
        assert_eq!(view.notification(), Some("Order status updated successfully!"));
        assert_eq!(view.next_status_label(), "Next: Shipped");

        view.dismiss_notification();
        assert_eq!(view.notification(), None);
    }

    #[tokio::test]
    async fn test_completed_order_disables_control() {
        let mut api = MockOrdersApi::new();
        api.expect_fetch_order()
            .returning(|_| Ok(order(OrderStatus::Complete)));
        api.expect_advance_order_status().times(0);

        let mut view = view(api, OperatorRole::SuperAdmin);
        view.load().await.unwrap();

        assert_eq!(view.next_status_label(), "Completed");
        assert!(!view.can_advance());
        assert_eq!(view.begin_advance(), None);
        assert_eq!(view.confirm_advance().await, None);
    }

    #[tokio::test]
    async fn test_conflict_keeps_displayed_status() {
        let mut api = MockOrdersApi::new();
        api.expect_fetch_order()
            .times(1)
            .returning(|_| Ok(order(OrderStatus::Roasting)));
        api.expect_advance_order_status().times(1).returning(|_, _| {
            Err(ApiError::Status {
                status: 409,
                message: "conflict".to_string(),
            })
        });

        let mut view = view(api, OperatorRole::SuperAdmin);
        view.load().await.unwrap();
        view.begin_advance();
        let event = view.confirm_advance().await;

        let Some(AdvanceEvent::Failed(error)) = event else {
            panic!("expected a failed advance, got {event:?}");
        };
        assert_eq!(error.kind, ErrorKind::Conflict);
        assert_eq!(
            view.last_error().map(|e| e.message.as_str()),
            Some("This order was changed by someone else. Refresh to see its current status.")
        );
        assert_eq!(view.order().unwrap().status, OrderStatus::Roasting);
        assert_eq!(view.notification(), None);
        assert!(view.can_advance());
    }

    #[tokio::test]
    async fn test_cancel_makes_no_call() {
        let mut api = MockOrdersApi::new();
        api.expect_fetch_order()
            .returning(|_| Ok(order(OrderStatus::Shipped)));
        api.expect_advance_order_status().times(0);

        let mut view = view(api, OperatorRole::SuperAdmin);
        view.load().await.unwrap();
        assert_eq!(view.begin_advance(), Some(OrderStatus::Complete));
        view.cancel_advance();
        assert_eq!(view.confirm_advance().await, None);
    }

    #[tokio::test]
    async fn test_admin_role_cannot_advance() {
        let mut api = MockOrdersApi::new();
        api.expect_fetch_order()
            .returning(|_| Ok(order(OrderStatus::Confirm)));

        let mut view = view(api, OperatorRole::Admin);
        view.load().await.unwrap();
        assert!(!view.can_advance());
        assert_eq!(view.begin_advance(), None);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_order() {
        let mut api = MockOrdersApi::new();
        let mut reads = 0;
        api.expect_fetch_order().returning(move |_| {
            reads += 1;
            if reads == 1 {
                Ok(order(OrderStatus::Confirm))
            } else {
                Err(ApiError::Network("offline".to_string()))
            }
        });

        let mut view = view(api, OperatorRole::SuperAdmin);
        assert_eq!(view.next_status_label(), "Loading...");
        view.load().await.unwrap();
        view.workflow.cache().clear();

        let err = view.load().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(view.order().unwrap().status, OrderStatus::Confirm);
    }
}
