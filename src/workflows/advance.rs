//! Advancing an order one step along its lifecycle.
//!
//! The workflow asks the server for the next status and then re-reads the
//! order. It never writes a status locally: on success the cached order is
//! invalidated and fetched again, on failure nothing changes.

use crate::api::{classify, ClassifiedError, Order, OrderQuery, OrdersApi, Resource};
use crate::cache::{QueryCache, QueryKey};
use crate::telemetry::{create_workflow_span, generate_correlation_id};
use crate::workflows::order_status::{next_status, OrderStatus};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn, Instrument};

pub const SUCCESS_NOTIFICATION: &str = "Order status updated successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The order is complete or cancelled; there is nothing to request.
    Terminal,
    /// Another advance for this order has not finished yet.
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Advanced {
        requested: OrderStatus,
        status_token: String,
        /// Freshly fetched order; `None` if the re-read failed after the
        /// server accepted the change.
        order: Option<Order>,
        notification: &'static str,
    },
    Skipped(SkipReason),
}

type InFlight = Arc<Mutex<HashSet<String>>>;

/// Marks an order as having an advance in flight until dropped.
struct InFlightGuard {
    in_flight: InFlight,
    order_id: String,
}

impl InFlightGuard {
    fn acquire(in_flight: &InFlight, order_id: &str) -> Option<Self> {
        let mut pending = in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !pending.insert(order_id.to_string()) {
            return None;
        }
        Some(Self {
            in_flight: Arc::clone(in_flight),
            order_id: order_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut pending = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&self.order_id);
    }
}

pub struct OrderStatusWorkflow<A: ?Sized> {
    api: Arc<A>,
    cache: QueryCache,
    in_flight: InFlight,
}

impl<A: ?Sized> Clone for OrderStatusWorkflow<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: self.cache.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<A: OrdersApi + ?Sized> OrderStatusWorkflow<A> {
    pub fn new(api: Arc<A>, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn is_pending(&self, order_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(order_id)
    }

    /// Read-through fetch of a single order.
    pub async fn fetch_order(&self, order_id: &str) -> Result<Order, ClassifiedError> {
        self.cache
            .fetch(QueryKey::order(order_id), || self.api.fetch_order(order_id))
            .await
            .map_err(|e| classify(&e, Resource::Order))
    }

    /// Drop any cached copy and read the order from the server.
    pub async fn refresh_order(&self, order_id: &str) -> Result<Order, ClassifiedError> {
        self.invalidate_order(order_id).await;
        self.fetch_order(order_id).await
    }

    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ClassifiedError> {
        self.cache
            .fetch(QueryKey::order_list(&query.cache_segment()), || {
                self.api.list_orders(query)
            })
            .await
            .map_err(|e| classify(&e, Resource::Order))
    }

    async fn invalidate_order(&self, order_id: &str) {
        self.cache.invalidate(&QueryKey::order(order_id)).await;
        self.cache.invalidate(&QueryKey::order_lists()).await;
    }

    /// Request the successor of `current` for `order_id`.
    ///
    /// Terminal statuses and concurrent calls for the same order are no-ops
    /// that make no API call. Errors are classified and never retried.
    pub async fn request_advance(
        &self,
        order_id: &str,
        current: OrderStatus,
    ) -> Result<AdvanceOutcome, ClassifiedError> {
        let Some(next) = next_status(current) else {
            debug!(order_id = %order_id, status = %current, "Order is terminal, nothing to advance");
            return Ok(AdvanceOutcome::Skipped(SkipReason::Terminal));
        };

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, order_id) else {
            debug!(order_id = %order_id, "Advance already in flight, ignoring");
            return Ok(AdvanceOutcome::Skipped(SkipReason::AlreadyPending));
        };

        let correlation_id = generate_correlation_id();
        let span = create_workflow_span("advance_order", Some(order_id), Some(&correlation_id));

        async {
            info!(from = %current, to = %next, "Requesting order advance");

            let status_token = self
                .api
                .advance_order_status(order_id, next)
                .await
                .map_err(|e| {
                    let classified = classify(&e, Resource::Order);
                    warn!(error = %e, kind = ?classified.kind, "Order advance rejected");
                    classified
                })?;

            self.invalidate_order(order_id).await;

            let order = match self.fetch_order(order_id).await {
                Ok(order) => {
                    info!(status = %order.status, "Order re-read after advance");
                    Some(order)
                }
                Err(e) => {
                    warn!(error = %e, "Order advanced but could not be re-read");
                    None
                }
            };

            Ok(AdvanceOutcome::Advanced {
                requested: next,
                status_token,
                order,
                notification: SUCCESS_NOTIFICATION,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ErrorKind, MockOrdersApi};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio_test::assert_pending;

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

    fn cache() -> QueryCache {
        QueryCache::new(100, Duration::from_secs(60))
    }

    fn workflow(api: MockOrdersApi) -> OrderStatusWorkflow<MockOrdersApi> {
        OrderStatusWorkflow::new(Arc::new(api), cache())
    }

    #[tokio::test]
    async fn test_terminal_orders_make_no_call() {
        let mut api = MockOrdersApi::new();
        api.expect_advance_order_status().times(0);
        let workflow = workflow(api);

        for status in [OrderStatus::Complete, OrderStatus::Cancelled] {
            let outcome = workflow.request_advance("7", status).await.unwrap();
            assert_eq!(outcome, AdvanceOutcome::Skipped(SkipReason::Terminal));
        }
    }

    #[tokio::test]
    async fn test_success_requests_next_status_and_refetches() {
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
        let workflow = workflow(api);

        // Prime the cache with the pre-advance copy
        let before = workflow.fetch_order("7").await.unwrap();
        assert_eq!(before.status, OrderStatus::Confirm);

        let outcome = workflow
            .request_advance("7", OrderStatus::Confirm)
            .await
            .unwrap();

        match outcome {
            AdvanceOutcome::Advanced {
                requested,
                order,
                notification,
                ..
            } => {
                assert_eq!(requested, OrderStatus::Roasting);
                assert_eq!(order.unwrap().status, OrderStatus::Roasting);
                assert_eq!(notification, SUCCESS_NOTIFICATION);
            }
            other => panic!("expected an advance, got {other:?}"),
        }

        // The fresh copy is what the cache now serves
        let after = workflow.fetch_order("7").await.unwrap();
        assert_eq!(after.status, OrderStatus::Roasting);
    }

    #[tokio::test]
    async fn test_conflict_leaves_cached_order_untouched() {
        let mut api = MockOrdersApi::new();
        api.expect_fetch_order()
            .times(1)
            .returning(|_| Ok(order(OrderStatus::Roasting)));
        api.expect_advance_order_status().times(1).returning(|_, _| {
            Err(ApiError::Status {
                status: 409,
                message: "order already advanced".to_string(),
            })
        });
        let workflow = workflow(api);

        workflow.fetch_order("7").await.unwrap();
        let error = workflow
            .request_advance("7", OrderStatus::Roasting)
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Conflict);
        assert!(error.message.contains("Refresh"));
        assert!(!workflow.is_pending("7"));

        // Served from cache, still the last known-good status
        let displayed = workflow.fetch_order("7").await.unwrap();
        assert_eq!(displayed.status, OrderStatus::Roasting);
    }

    #[tokio::test]
    async fn test_failed_reread_still_reports_advance() {
        let mut api = MockOrdersApi::new();
        api.expect_advance_order_status()
            .returning(|_, _| Ok("shipped".to_string()));
        api.expect_fetch_order()
            .returning(|_| Err(ApiError::Network("connection reset".to_string())));
        let workflow = workflow(api);

        let outcome = workflow
            .request_advance("7", OrderStatus::Roasting)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            AdvanceOutcome::Advanced { order: None, requested: OrderStatus::Shipped, .. }
        ));
    }

    #[tokio::test]
    async fn test_network_failure_is_not_retried() {
        let mut api = MockOrdersApi::new();
        api.expect_advance_order_status()
            .times(1)
            .returning(|_, _| Err(ApiError::Network("unreachable".to_string())));
        let workflow = workflow(api);

        let error = workflow
            .request_advance("7", OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Network);
    }

    /// Holds every advance until released, so a second call can race it.
    struct GatedOrdersApi {
        advance_calls: AtomicUsize,
        release: Notify,
        status: Mutex<OrderStatus>,
    }

    #[async_trait]
    impl OrdersApi for GatedOrdersApi {
        async fn list_orders(&self, _query: &OrderQuery) -> Result<Vec<Order>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_order(&self, _order_id: &str) -> Result<Order, ApiError> {
            Ok(order(*self.status.lock().unwrap()))
        }

        async fn advance_order_status(
            &self,
            _order_id: &str,
            next: OrderStatus,
        ) -> Result<String, ApiError> {
            self.advance_calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            *self.status.lock().unwrap() = next;
            Ok(next.to_string())
        }
    }

    #[tokio::test]
    async fn test_single_flight_per_order() {
        let api = Arc::new(GatedOrdersApi {
            advance_calls: AtomicUsize::new(0),
            release: Notify::new(),
            status: Mutex::new(OrderStatus::Confirm),
        });
        let workflow = OrderStatusWorkflow::new(Arc::clone(&api), cache());

        let mut first = tokio_test::task::spawn(workflow.request_advance("7", OrderStatus::Confirm));
        assert_pending!(first.poll());
        assert!(workflow.is_pending("7"));

        let second = workflow
            .request_advance("7", OrderStatus::Confirm)
            .await
            .unwrap();
        assert_eq!(second, AdvanceOutcome::Skipped(SkipReason::AlreadyPending));
        assert_eq!(api.advance_calls.load(Ordering::SeqCst), 1);

        api.release.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Advanced { .. }));
        assert!(!workflow.is_pending("7"));
        assert_eq!(api.advance_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_request_releases_the_order() {
        let api = Arc::new(GatedOrdersApi {
            advance_calls: AtomicUsize::new(0),
            release: Notify::new(),
            status: Mutex::new(OrderStatus::Confirm),
        });
        let workflow = OrderStatusWorkflow::new(Arc::clone(&api), cache());

        let mut abandoned =
            tokio_test::task::spawn(workflow.request_advance("7", OrderStatus::Confirm));
        assert_pending!(abandoned.poll());
        drop(abandoned);

        assert!(!workflow.is_pending("7"));
        assert_eq!(*api.status.lock().unwrap(), OrderStatus::Confirm);
    }
}
