//! Order status workflow against a wiremock backend.
//!
//! These tests drive the real `ApiClient` over HTTP so the path, verb,
//! bearer header and envelope handling are all exercised together.

use roastery_admin::api::{ApiClient, ErrorKind, OperatorRole, OrderQuery, SortOrder};
use roastery_admin::views::{AdvanceEvent, OrderDetailView};
use roastery_admin::workflows::{AdvanceOutcome, OrderStatus, OrderStatusWorkflow, SkipReason};
use roastery_admin::{QueryCache, RoasteryConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "jwt-token";

fn order_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "customer_email": "user@test.com",
        "customer_name": "user",
        "street": "Jl. Kopi 1",
        "city": "Bandung",
        "phone_number": "0812",
        "alternative_phone_number": null,
        "items": [{
            "bean_name": "Arabica",
            "form_name": "Whole",
            "roasted": "medium",
            "price": 100.0,
            "order_quantity": 3
        }],
        "total_price": 300.0,
        "created_at": "2024-05-01T10:00:00Z",
        "status": status
    })
}

fn envelope(data: Value) -> Value {
    json!({ "data": data, "error": null })
}

fn client(server: &MockServer) -> ApiClient {
    let mut settings = RoasteryConfig::default().api;
    settings.base_url = format!("{}/api/v1", server.uri());
    ApiClient::new(&settings).unwrap().with_token(TOKEN)
}

fn workflow(server: &MockServer) -> OrderStatusWorkflow<ApiClient> {
    let cache = QueryCache::new(100, Duration::from_secs(60));
    OrderStatusWorkflow::new(Arc::new(client(server)), cache)
}

#[tokio::test]
async fn test_confirm_order_is_roasted_then_refetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/orders/7"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(order_json(7, "confirm"))))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/orders/7/roast"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!("roasting"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orders/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(order_json(7, "roasting"))))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = OrderDetailView::new(workflow(&server), "7", OperatorRole::SuperAdmin);
    let loaded = view.load().await.unwrap();
    assert_eq!(loaded.status, OrderStatus::Confirm);
    assert_eq!(loaded.id, "7");

    assert_eq!(view.begin_advance(), Some(OrderStatus::Roasting));
    match view.confirm_advance().await {
        Some(AdvanceEvent::Refreshed(order)) => assert_eq!(order.status, OrderStatus::Roasting),
        other => panic!("expected a refreshed order, got {other:?}"),
    }
    assert_eq!(view.notification(), Some("Order status updated successfully!"));
    assert_eq!(view.next_status_label(), "Next: Shipped");
}

#[tokio::test]
async fn test_conflict_is_classified_and_status_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/orders/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(order_json(9, "roasting"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/orders/9/ship"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "data": null, "error": "order status changed" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let workflow = workflow(&server);
    workflow.fetch_order("9").await.unwrap();

    let err = workflow
        .request_advance("9", OrderStatus::Roasting)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(
        err.message,
        "This order was changed by someone else. Refresh to see its current status."
    );

    // Served from cache: still the pre-request status
    let order = workflow.fetch_order("9").await.unwrap();
    assert_eq!(order.status, OrderStatus::Roasting);
    assert!(!workflow.is_pending("9"));
}

#[tokio::test]
async fn test_complete_order_never_reaches_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = workflow(&server)
        .request_advance("3", OrderStatus::Complete)
        .await
        .unwrap();
    assert_eq!(outcome, AdvanceOutcome::Skipped(SkipReason::Terminal));
}

#[tokio::test]
async fn test_missing_token_fails_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = RoasteryConfig::default().api;
    settings.base_url = server.uri();
    let anonymous = ApiClient::new(&settings).unwrap();
    let workflow = OrderStatusWorkflow::new(
        Arc::new(anonymous),
        QueryCache::new(10, Duration::from_secs(60)),
    );

    let err = workflow.fetch_order("1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.message, "Your session has expired. Please log in again.");
}

#[tokio::test]
async fn test_order_list_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/orders"))
        .and(query_param("status", "shipped"))
        .and(query_param("sort", "desc"))
        .and(query_param("offset", "10"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            order_json(4, "shipped"),
            order_json(5, "shipped")
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let query = OrderQuery {
        status: Some(OrderStatus::Shipped),
        sort: SortOrder::Desc,
        offset: Some(10),
        limit: Some(10),
    };
    let workflow = workflow(&server);
    let orders = workflow.list_orders(&query).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.status == OrderStatus::Shipped));

    // Second read is served from cache
    workflow.list_orders(&query).await.unwrap();
}

#[tokio::test]
async fn test_server_error_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/orders/2"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({ "data": null, "error": "maintenance" })),
        )
        .mount(&server)
        .await;

    let err = workflow(&server).fetch_order("2").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "Server error. Please try again later.");
}
