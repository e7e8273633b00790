//! Sign-in and catalog endpoints against a wiremock backend.

use roastery_admin::api::{
    sign_in, ApiClient, AuthApi, ErrorKind, InventoryApi, LoginError, OperatorRole, ProductImage,
    ProductMetadata, ProductQuery, SortOrder,
};
use roastery_admin::workflows::CatalogService;
use roastery_admin::{QueryCache, RoasteryConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn anonymous(server: &MockServer) -> ApiClient {
    let mut settings = RoasteryConfig::default().api;
    settings.base_url = format!("{}/api/v1/", server.uri());
    ApiClient::new(&settings).unwrap()
}

fn signed_in_json(role: &str) -> serde_json::Value {
    json!({
        "data": {
            "token": "jwt-token",
            "user": { "id": 1, "email": "boss@roastery.test", "role_name": role }
        },
        "error": null
    })
}

#[tokio::test]
async fn test_super_admin_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/authentication/sign-in"))
        .and(body_json(json!({ "email": "boss@roastery.test", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(signed_in_json("super admin")))
        .expect(1)
        .mount(&server)
        .await;

    let (signed_in, role) = sign_in(&anonymous(&server), "boss@roastery.test", "secret")
        .await
        .unwrap();
    assert_eq!(signed_in.token, "jwt-token");
    assert_eq!(role, OperatorRole::SuperAdmin);
}

#[tokio::test]
async fn test_customer_account_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/authentication/sign-in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(signed_in_json("customer")))
        .mount(&server)
        .await;

    let err = sign_in(&anonymous(&server), "boss@roastery.test", "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::NotAuthorized { .. }));
}

#[tokio::test]
async fn test_wrong_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/authentication/sign-in"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "data": null, "error": "invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = sign_in(&anonymous(&server), "boss@roastery.test", "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
}

#[tokio::test]
async fn test_profile_uses_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/profile"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "email": "boss@roastery.test",
                "username": "boss",
                "isActive": true,
                "createdAt": "2024-01-01"
            },
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = anonymous(&server)
        .with_token("jwt-token")
        .profile()
        .await
        .unwrap();
    assert_eq!(profile.username, "boss");
    assert!(profile.is_active);
}

#[tokio::test]
async fn test_bean_create_invalidates_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/beans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1, "name": "Arabica" }],
            "error": null
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/beans"))
        .and(body_json(json!({ "name": "Robusta" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": "bean created", "error": null })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = anonymous(&server).with_token("jwt-token");
    let catalog = CatalogService::new(Arc::new(client), QueryCache::new(100, Duration::from_secs(60)));

    catalog.list_beans().await.unwrap();
    catalog.list_beans().await.unwrap();
    assert_eq!(catalog.create_bean("Robusta").await.unwrap(), "bean created");
    catalog.list_beans().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_form_name() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/forms/2"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "data": null, "error": "duplicate" })),
        )
        .mount(&server)
        .await;

    let client = anonymous(&server).with_token("jwt-token");
    let catalog = CatalogService::new(Arc::new(client), QueryCache::new(100, Duration::from_secs(60)));
    let err = catalog.edit_form(2, "Ground").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.message, "A form with that name already exists.");
}

#[tokio::test]
async fn test_product_filters_in_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("bean", "Arabica"))
        .and(query_param("roast", "dark"))
        .and(query_param("sort", "asc"))
        .and(query_param("offset", "2"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 5, "bean": "Arabica", "roasted": "dark", "form": "Whole",
                "price": 120.5, "quantity": 4, "image": null
            }],
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = anonymous(&server).with_token("jwt-token");
    let products = client
        .list_products(&ProductQuery {
            bean: Some("Arabica".to_string()),
            form: None,
            roast: Some("dark".to_string()),
            sort: Some(SortOrder::Asc),
            offset: Some(2),
            limit: Some(2),
        })
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].quantity, 4);
}

#[tokio::test]
async fn test_product_create_is_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/products"))
        .and(body_string_contains("name=\"metadata\""))
        .and(body_string_contains("\"bean\":\"Arabica\""))
        .and(body_string_contains("filename=\"beans.png\""))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": "product created", "error": null })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let metadata = ProductMetadata {
        bean: "Arabica".to_string(),
        roasted: "medium".to_string(),
        form: "Whole".to_string(),
        price: 99.0,
        quantity: 10,
    };
    let image = ProductImage {
        file_name: "beans.png".to_string(),
        bytes: b"fake-png-bytes".to_vec(),
    };

    let message = anonymous(&server)
        .with_token("jwt-token")
        .create_product(&metadata, Some(image))
        .await
        .unwrap();
    assert_eq!(message, "product created");
}
