//! End-to-end flows over a real SQLite store and a loopback HTTP backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use mariam_core::catalog::{piece_candidate, scan_candidate};
use mariam_core::{CartLine, NewCartLine, CART_STORAGE_KEY};
use mariam_mobile::api::{ApiClient, PendingSaleApi};
use mariam_mobile::checkout::send_to_cashier;
use mariam_mobile::cli::run::{resolve_presentation, scan_presentation};
use mariam_mobile::error::ErrorCode;
use mariam_mobile::state::ClientConfig;
use mariam_mobile::App;
use mariam_store::{load_json, Database, DbConfig, KeyValueStore};

// =============================================================================
// Loopback backend
// =============================================================================

/// One request as the backend saw it.
#[derive(Debug, Clone)]
struct Recorded {
    method: &'static str,
    uri: String,
    body: Value,
}

/// Canned backend state shared by the handlers.
#[derive(Clone)]
struct Backend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    sale_reply: (StatusCode, Value),
    pending: Value,
    products: Vec<Value>,
}

impl Backend {
    fn new() -> Self {
        Backend {
            requests: Arc::new(Mutex::new(Vec::new())),
            sale_reply: (StatusCode::CREATED, json!({})),
            pending: json!([]),
            products: Vec::new(),
        }
    }

    fn sale_reply(mut self, status: StatusCode, body: Value) -> Self {
        self.sale_reply = (status, body);
        self
    }

    fn pending(mut self, sales: Value) -> Self {
        self.pending = sales;
        self
    }

    fn product(mut self, product: Value) -> Self {
        self.products.push(product);
        self
    }

    fn record(&self, method: &'static str, uri: &Uri, body: Value) {
        self.requests.lock().unwrap().push(Recorded {
            method,
            uri: uri.to_string(),
            body,
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Serves the router on an ephemeral loopback port and returns its base URL.
    async fn serve(&self) -> String {
        let router = Router::new()
            .route("/api/pending-sales", get(list_sales).post(create_sale))
            .route("/api/pending-sales/{id}", delete(delete_sale))
            .route("/api/products/code/{code}", get(product_by_code))
            .route("/api/products/filters", get(search_products))
            .with_state(self.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        format!("http://{}", addr)
    }
}

async fn create_sale(
    State(backend): State<Backend>,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.record("POST", &uri, body);
    let (status, reply) = backend.sale_reply.clone();
    (status, Json(reply))
}

async fn list_sales(State(backend): State<Backend>, uri: Uri) -> Json<Value> {
    backend.record("GET", &uri, Value::Null);
    Json(backend.pending.clone())
}

async fn delete_sale(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    uri: Uri,
) -> Json<Value> {
    backend.record("DELETE", &uri, Value::Null);
    Json(json!({ "ok": true, "id": id }))
}

async fn product_by_code(
    State(backend): State<Backend>,
    Path(code): Path<String>,
    uri: Uri,
) -> (StatusCode, Json<Value>) {
    backend.record("GET", &uri, Value::Null);
    match backend.products.iter().find(|p| p["code"] == code.as_str()) {
        Some(product) => (StatusCode::OK, Json(product.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Producto no encontrado" })),
        ),
    }
}

async fn search_products(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
) -> Json<Value> {
    backend.record("GET", &uri, Value::Null);
    let search = params.get("search").map(|s| s.to_lowercase()).unwrap_or_default();
    let found: Vec<Value> = backend
        .products
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .map(|name| name.to_lowercase().contains(&search))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    Json(Value::Array(found))
}

fn config_for(api_url: &str) -> ClientConfig {
    ClientConfig {
        api_url: Some(api_url.to_string()),
        sound_enabled: false,
        ..ClientConfig::default()
    }
}

async fn app_for(api_url: &str) -> App {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let app = App::with_database(config_for(api_url), db);
    app.ledger.ready().await;
    app
}

fn refresco() -> Value {
    json!({
        "id": 8, "name": "Refresco", "price": 18, "code": "7501", "saleType": "Pieza",
        "presentations": [
            {"id": 1, "name": "Lata", "unitPrice": 18},
            {"id": 2, "name": "Six", "quantity": 6, "unitPrice": 99, "isDefault": true}
        ]
    })
}

fn papel() -> Value {
    json!({
        "id": 21, "name": "Papel bond", "price": 3, "code": "7502", "saleType": "pieza",
        "presentations": [
            {"id": 5, "name": "Paquete", "quantity": 12, "unitPrice": 30, "isDefault": true}
        ]
    })
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_send_to_cashier_posts_cart_and_clears_it() {
    let backend = Backend::new().sale_reply(
        StatusCode::CREATED,
        json!({"id": 17, "code": "PV-0017", "clientName": "Ana", "total": 85, "status": "pending"}),
    );
    let url = backend.serve().await;
    let app = app_for(&url).await;

    app.ledger
        .add_line(NewCartLine::new("12", "Cuaderno", 2.0, 35.0).with_presentation("3", "Pieza"));
    app.ledger.add_line(NewCartLine::new("40", "Lápiz", 1.0, 15.0));
    app.ledger.flush().await;

    let store = app.db.key_values();
    assert!(store.get_item(CART_STORAGE_KEY).await.unwrap().is_some());

    let api = app.api().await.unwrap();
    let receipt = send_to_cashier(&app.ledger, &api, &app.config, "  Ana ")
        .await
        .unwrap();

    assert_eq!(receipt.code, "PV-0017");
    assert_eq!(receipt.sale_id.as_deref(), Some("17"));
    assert_eq!(receipt.total, 85.0);
    assert_eq!(receipt.line_count, 2);
    assert!(app.ledger.is_empty());

    app.ledger.flush().await;
    assert!(store.get_item(CART_STORAGE_KEY).await.unwrap().is_none());

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].uri, "/api/pending-sales");

    let body = &requests[0].body;
    assert_eq!(body["clientName"], "Ana");
    assert_eq!(body["total"], 85.0);
    assert_eq!(body["details"][0]["productId"], 12);
    assert_eq!(body["details"][0]["presentationId"], 3);
    assert_eq!(body["details"][0]["subTotal"], 70.0);

    app.shutdown().await;
}

#[tokio::test]
async fn test_rejected_sale_keeps_persisted_cart() {
    let backend =
        Backend::new().sale_reply(StatusCode::BAD_REQUEST, json!({"error": "Caja cerrada"}));
    let url = backend.serve().await;
    let app = app_for(&url).await;

    app.ledger.add_line(NewCartLine::new("40", "Lápiz", 3.0, 5.0));
    let api = app.api().await.unwrap();

    let err = send_to_cashier(&app.ledger, &api, &app.config, "Ana")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BackendError);
    assert_eq!(err.message, "Caja cerrada");

    app.ledger.flush().await;
    let saved: Option<Vec<CartLine>> = load_json(&app.db.key_values(), CART_STORAGE_KEY)
        .await
        .unwrap();
    assert_eq!(saved.unwrap().len(), 1);
    assert_eq!(app.ledger.item_count(), 3);
    assert_eq!(backend.requests().len(), 1);

    app.shutdown().await;
}

#[tokio::test]
async fn test_scanned_product_adds_one_unit() {
    let backend = Backend::new().product(refresco()).product(papel());
    let url = backend.serve().await;
    let app = app_for(&url).await;
    let api = ApiClient::new(&url, app.config.request_timeout()).unwrap();

    assert!(api.product_by_code("0000").await.unwrap().is_none());

    // Several presentations: the scan needs an explicit choice.
    let refresco = api.product_by_code("7501").await.unwrap().unwrap();
    let err = scan_presentation(&refresco, None).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let six = scan_presentation(&refresco, Some("2")).unwrap();
    let line = app.ledger.add_line(scan_candidate(&refresco, six));
    assert_eq!(line.presentation_id.as_deref(), Some("2"));
    assert_eq!(line.quantity, 1.0);
    assert_eq!(line.total, 99.0);

    // A single default presentation is scanned as one unit at its price.
    let papel = api.product_by_code("7502").await.unwrap().unwrap();
    let paquete = scan_presentation(&papel, None).unwrap();
    let line = app.ledger.add_line(scan_candidate(&papel, paquete));
    assert_eq!(line.quantity, 1.0);
    assert_eq!(line.total, 30.0);

    // Picking from the listing adds the whole pack instead.
    let line = app
        .ledger
        .add_line(piece_candidate(&papel, resolve_presentation(&papel, None).unwrap()));
    assert_eq!(line.quantity, 13.0);
    assert_eq!(app.ledger.lines().len(), 2);
    assert_eq!(app.ledger.total(), 99.0 + 390.0);

    let uris: Vec<String> = backend.requests().into_iter().map(|r| r.uri).collect();
    assert_eq!(
        uris,
        vec![
            "/api/products/code/0000",
            "/api/products/code/7501",
            "/api/products/code/7502",
        ]
    );

    app.shutdown().await;
}

#[tokio::test]
async fn test_search_products_sends_encoded_text() {
    let backend = Backend::new().product(refresco()).product(papel());
    let url = backend.serve().await;
    let api = ApiClient::new(&url, mariam_mobile::api::client::DEFAULT_TIMEOUT).unwrap();

    let found = api.search_products("Papel bond").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "21");
    assert_eq!(found[0].display_price(), 30.0);

    assert!(api.search_products("leche").await.unwrap().is_empty());

    let requests = backend.requests();
    assert_eq!(requests[0].uri, "/api/products/filters?search=Papel+bond");
}

#[tokio::test]
async fn test_pending_sales_list_and_delete() {
    let backend = Backend::new().pending(json!([
        {"id": 3, "code": "PV-0003", "clientName": "Luis", "total": 40.5,
         "createdAt": "2024-05-01T10:00:00Z"},
        {"id": "4", "code": "PV-0004"}
    ]));
    let url = backend.serve().await;
    let api = ApiClient::new(&url, mariam_mobile::api::client::DEFAULT_TIMEOUT).unwrap();

    let sales = api.list_pending_sales().await.unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].id.as_deref(), Some("3"));
    assert_eq!(sales[1].id.as_deref(), Some("4"));
    assert!(sales[0].created_at.is_some());

    api.delete_pending_sale("3").await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].uri, "/api/pending-sales/3");
}

#[tokio::test]
async fn test_cart_saved_with_numeric_ids_is_restored() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.key_values()
        .set_item(
            CART_STORAGE_KEY,
            r#"[{"productId":12,"productName":"Cuaderno","presentationId":3,
                "presentationName":"Pieza","quantity":2,"unitPrice":35,"total":70}]"#,
        )
        .await
        .unwrap();

    let app = App::with_database(config_for("http://127.0.0.1:9"), db);
    app.ledger.ready().await;

    let lines = app.ledger.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, "12");
    assert_eq!(lines[0].presentation_id.as_deref(), Some("3"));

    assert!(app.ledger.update_quantity("12", Some("3"), 3.0));
    app.ledger.flush().await;

    let saved: Option<Vec<CartLine>> = load_json(&app.db.key_values(), CART_STORAGE_KEY)
        .await
        .unwrap();
    assert_eq!(saved.unwrap()[0].total, 105.0);

    app.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let app = app_for(&url).await;
    app.ledger.add_line(NewCartLine::new("1", "Goma", 1.0, 4.0));

    let api = app.api().await.unwrap();
    let err = send_to_cashier(&app.ledger, &api, &app.config, "Ana")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NetworkError);
    assert_eq!(app.ledger.lines().len(), 1);

    app.shutdown().await;
}
