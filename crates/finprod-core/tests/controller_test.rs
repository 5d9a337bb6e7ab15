#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a wiremock products API.

use chrono::NaiveDate;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use finprod_core::{
    Command, CommandResult, ConnectionState, Controller, ControllerConfig, CoreError, ProductDraft,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> ControllerConfig {
    let url = Url::parse(&format!("{}/bp", server.uri())).unwrap();
    ControllerConfig::new(url)
}

fn product_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "Producto financiero de prueba",
        "logo": "https://example.com/logo.png",
        "date_release": "2025-01-01",
        "date_revision": "2026-01-01"
    })
}

fn draft(id: &str) -> ProductDraft {
    ProductDraft {
        id: id.into(),
        name: "Cuenta Digital".into(),
        description: "Cuenta sin costo de mantenimiento".into(),
        logo: "https://example.com/logo.png".into(),
        date_release: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        date_revision: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    }
}

async fn mount_list(server: &MockServer, products: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": products })))
        .mount(server)
        .await;
}

async fn connected(server: &MockServer) -> Controller {
    let controller = Controller::new(config_for(server));
    controller.connect().await.unwrap();
    controller
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn connect_loads_the_cache() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        json!([product_json("trj-crd", "Tarjeta Credito"), product_json("cta-aho", "Cuenta Ahorros")]),
    )
    .await;

    let controller = connected(&server).await;

    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Connected);
    assert_eq!(controller.products().len(), 2);
    assert_eq!(controller.product("cta-aho").unwrap().name, "Cuenta Ahorros");
    assert_eq!(controller.search("tarjeta").len(), 1);
    controller.disconnect().await;
    assert_eq!(
        *controller.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn failed_connect_can_be_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_list(&server, json!([product_json("trj-crd", "Tarjeta Credito")])).await;

    let controller = Controller::new(config_for(&server));
    let err = controller.connect().await.unwrap_err();
    assert!(matches!(err, CoreError::ServerError { .. }));
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);

    controller.connect().await.unwrap();
    assert_eq!(controller.products().len(), 1);
}

#[tokio::test]
async fn execute_requires_connection() {
    let server = MockServer::start().await;
    let controller = Controller::new(config_for(&server));
    let err = controller.execute(Command::Refresh).await.unwrap_err();
    assert!(matches!(err, CoreError::ControllerDisconnected));
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_refetches_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_list(&server, json!([product_json("cta-dig", "Cuenta Digital")])).await;
    Mock::given(method("POST"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Product added successfully",
            "data": product_json("cta-dig", "Cuenta Digital")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    assert!(controller.products().is_empty());

    let result = controller
        .execute(Command::CreateProduct(draft("cta-dig")))
        .await
        .unwrap();
    let CommandResult::Product(product) = result else {
        panic!("expected product, got {result:?}");
    };
    assert_eq!(product.id, "cta-dig");
    assert_eq!(controller.products()[0].id, "cta-dig");
}

#[tokio::test]
async fn update_and_delete() {
    let server = MockServer::start().await;
    mount_list(&server, json!([product_json("cta-dig", "Cuenta Digital")])).await;
    Mock::given(method("PUT"))
        .and(path("/bp/products/cta-dig"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Product updated successfully",
            "data": product_json("cta-dig", "Cuenta Digital Plus")
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/bp/products/cta-dig"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Product removed successfully" })),
        )
        .mount(&server)
        .await;

    let controller = connected(&server).await;

    let changes = draft("cta-dig").changes();
    let result = controller
        .execute(Command::UpdateProduct {
            id: "cta-dig".into(),
            changes,
        })
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Product(p) if p.name == "Cuenta Digital Plus"));

    let result = controller
        .execute(Command::DeleteProduct {
            id: "cta-dig".into(),
        })
        .await
        .unwrap();
    let CommandResult::Deleted { id, message } = result else {
        panic!("expected delete result");
    };
    assert_eq!(id, "cta-dig");
    assert_eq!(message, "Product removed successfully");
}

#[tokio::test]
async fn delete_of_missing_product_maps_to_not_found() {
    let server = MockServer::start().await;
    mount_list(&server, json!([])).await;
    Mock::given(method("DELETE"))
        .and(path("/bp/products/nope"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "name": "NotFoundError", "message": "Not product found with that identifier" })),
        )
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let err = controller
        .execute(Command::DeleteProduct { id: "nope".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotFound { .. }));
    assert_eq!(err.user_message(), "Producto no encontrado.");
}

#[tokio::test]
async fn refresh_failure_after_write_does_not_fail_the_write() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [product_json("trj-crd", "Tarjeta Credito")] })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Product added successfully",
            "data": product_json("cta-dig", "Cuenta Digital")
        })))
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let result = controller
        .execute(Command::CreateProduct(draft("cta-dig")))
        .await;

    assert!(result.is_ok());
    // Cache keeps the last good list.
    assert_eq!(controller.products().len(), 1);
}

#[tokio::test]
async fn explicit_refresh_reports_count() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        json!([product_json("a-01", "Producto A"), product_json("b-01", "Producto B")]),
    )
    .await;

    let controller = connected(&server).await;
    let result = controller.execute(Command::Refresh).await.unwrap();
    assert!(matches!(result, CommandResult::Refreshed { count: 2 }));
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn verify_id_asks_the_backend() {
    let server = MockServer::start().await;
    mount_list(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/bp/products/verification/trj-crd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bp/products/verification/new-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    assert!(controller.verify_id("trj-crd").await.unwrap());
    assert!(!controller.verify_id("new-id").await.unwrap());
}

#[tokio::test]
async fn subscribers_see_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bp/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_list(&server, json!([product_json("a-01", "Producto A")])).await;

    let controller = connected(&server).await;
    let mut stream = controller.subscribe();
    assert!(stream.current().is_empty());

    controller.full_refresh().await.unwrap();
    let snapshot = stream.changed().await.unwrap();
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn oneshot_runs_and_disconnects() {
    let server = MockServer::start().await;
    mount_list(&server, json!([product_json("a-01", "Producto A")])).await;

    let names = Controller::oneshot(config_for(&server), |controller| async move {
        Ok(controller
            .products()
            .iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>())
    })
    .await
    .unwrap();

    assert_eq!(names, ["Producto A"]);
}
