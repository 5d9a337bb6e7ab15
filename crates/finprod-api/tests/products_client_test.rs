#![allow(clippy::unwrap_used)]
// Integration tests for `ProductsClient` using wiremock.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use finprod_api::error::messages;
use finprod_api::{Error, ProductRecord, ProductUpdateRecord, ProductsClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ProductsClient) {
    let server = MockServer::start().await;
    let base = format!("{}/bp", server.uri());
    let client = ProductsClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    (server, client)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_json() -> serde_json::Value {
    json!({
        "id": "trj-crd",
        "name": "Tarjetas de Credito",
        "description": "Tarjeta de consumo bajo la modalidad de credito",
        "logo": "https://example.com/visa.png",
        "date_release": "2025-01-01",
        "date_revision": "2026-01-01"
    })
}

fn sample_record() -> ProductRecord {
    ProductRecord {
        id: "trj-crd".into(),
        name: "Tarjetas de Credito".into(),
        description: "Tarjeta de consumo bajo la modalidad de credito".into(),
        logo: "https://example.com/visa.png".into(),
        date_release: date(2025, 1, 1),
        date_revision: date(2026, 1, 1),
    }
}

// ── List ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_products() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [sample_json()] })))
        .mount(&server)
        .await;

    let products = client.list_products().await.unwrap();
    assert_eq!(products, vec![sample_record()]);
}

#[tokio::test]
async fn test_list_products_empty_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(client.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_products_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_products().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Create / update / delete ────────────────────────────────────────

#[tokio::test]
async fn test_create_product_posts_full_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/bp/products"))
        .and(body_json(sample_json()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Product added successfully",
            "data": sample_json()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_product(&sample_record()).await.unwrap();
    assert_eq!(created.id, "trj-crd");
}

#[tokio::test]
async fn test_update_product_omits_id() {
    let (server, client) = setup().await;

    let changes = ProductUpdateRecord {
        name: "Tarjeta Platinum".into(),
        description: "Tarjeta de credito con beneficios".into(),
        logo: "https://example.com/platinum.png".into(),
        date_release: date(2025, 6, 1),
        date_revision: date(2026, 6, 1),
    };

    Mock::given(method("PUT"))
        .and(path("/bp/products/trj-crd"))
        .and(body_json(json!({
            "name": "Tarjeta Platinum",
            "description": "Tarjeta de credito con beneficios",
            "logo": "https://example.com/platinum.png",
            "date_release": "2025-06-01",
            "date_revision": "2026-06-01"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Product updated successfully",
            "data": {
                "id": "trj-crd",
                "name": "Tarjeta Platinum",
                "description": "Tarjeta de credito con beneficios",
                "logo": "https://example.com/platinum.png",
                "date_release": "2025-06-01",
                "date_revision": "2026-06-01"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client.update_product("trj-crd", &changes).await.unwrap();
    assert_eq!(updated.name, "Tarjeta Platinum");
}

#[tokio::test]
async fn test_delete_product_returns_message() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/bp/products/trj-crd"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Product removed successfully" })),
        )
        .mount(&server)
        .await;

    let message = client.delete_product("trj-crd").await.unwrap();
    assert_eq!(message, "Product removed successfully");
}

// ── Verification ────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_product_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/bp/products/verification/trj-crd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bp/products/verification/nuevo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    assert!(client.verify_product_id("trj-crd").await.unwrap());
    assert!(!client.verify_product_id("nuevo").await.unwrap());
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_status_codes_map_to_error_classes() {
    let cases = [
        (400, messages::INVALID_DATA),
        (404, messages::NOT_FOUND),
        (500, messages::SERVER),
        (503, messages::UNEXPECTED),
    ];

    for (status, expected) in cases {
        let (server, client) = setup().await;

        Mock::given(method("DELETE"))
            .and(path("/bp/products/trj-crd"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = client.delete_product("trj-crd").await.unwrap_err();
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.user_message(), expected, "status {status}");
    }
}

#[tokio::test]
async fn test_error_body_message_is_kept() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": "BadRequestError",
            "message": "Invalid body, check 'errors' property for more info."
        })))
        .mount(&server)
        .await;

    let err = client.create_product(&sample_record()).await.unwrap_err();
    match err {
        Error::BadRequest { message } => assert!(message.starts_with("Invalid body")),
        other => panic!("expected BadRequest, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base = format!("http://{addr}/bp");

    let client = ProductsClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    let err = client.list_products().await.unwrap_err();

    assert!(err.is_connection(), "expected connection error, got: {err:?}");
    assert_eq!(err.user_message(), messages::CONNECTION);
    assert_eq!(err.status(), None);
}
