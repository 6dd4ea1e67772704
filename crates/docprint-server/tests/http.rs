//! End-to-end tests through the router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use docprint::{ArtifactStore, Assembler, CacheConfig, MemoryStore};
use docprint_server::routes::{router, AppState, CACHE_HEADER, FINGERPRINT_HEADER};
use docprint_testkit::fixtures::{CountingAssembler, UnavailableStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const SAMPLE_FINGERPRINT: &str =
    "6b21a76f41c106144720583cd8c09ecaa57380d355a914f12e829e9fc060ac05";

const BODY_LIMIT: usize = 64 * 1024;

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    assembler: Arc<CountingAssembler>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let assembler = Arc::new(CountingAssembler::new());
    let state = AppState::new(
        store.clone() as Arc<dyn ArtifactStore>,
        assembler.clone() as Arc<dyn Assembler>,
        CacheConfig::default(),
    );
    Harness {
        app: router(state, BODY_LIMIT),
        store,
        assembler,
    }
}

/// The reference invoice. Parsed from text so the decimals keep their scale.
fn sample_body() -> Value {
    serde_json::from_str(
        r#"{
            "seller": "XYZ Pvt. Ltd.",
            "sellerAddress": "New Delhi, India",
            "sellerGstin": "29AABBCCDD121ZD",
            "buyer": "Vedant Computers",
            "buyerAddress": "New Delhi, India",
            "buyerGstin": "29AABBCCDD131ZD",
            "items": [
                { "name": "Product 1", "quantity": "12 Nos", "rate": 123.00, "amount": 1476.00 }
            ]
        }"#,
    )
    .unwrap()
}

fn generate_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/pdf/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn json_request(value: &Value) -> Request<Body> {
    generate_request(serde_json::to_vec(value).unwrap())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness();
    let response = h.app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn generate_renders_once_then_hits() {
    let h = harness();

    let first = h.app.clone().oneshot(json_request(&sample_body())).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header_str(&first, "content-type"), "application/pdf");
    assert_eq!(header_str(&first, FINGERPRINT_HEADER), SAMPLE_FINGERPRINT);
    assert_eq!(header_str(&first, CACHE_HEADER), "miss");
    let first_bytes = body_bytes(first).await;
    assert!(first_bytes.starts_with(b"%PDF-"));

    let second = h.app.clone().oneshot(json_request(&sample_body())).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header_str(&second, CACHE_HEADER), "hit");
    assert_eq!(body_bytes(second).await, first_bytes);

    assert_eq!(h.assembler.calls(), 1);
    assert_eq!(h.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn decimal_scale_changes_the_document() {
    let h = harness();
    let mut body = sample_body();
    body["items"][0]["rate"] = serde_json::from_str("123.0").unwrap();

    let response = h.app.clone().oneshot(json_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, FINGERPRINT_HEADER),
        "6712fcd9c611b06cd452f0ef5363febef8e65897a8fc1e6e0be043a39be46cb1"
    );
}

#[tokio::test]
async fn long_invoice_is_rendered_on_several_pages() {
    let h = harness();
    let mut body = sample_body();
    let item = body["items"][0].clone();
    body["items"] = Value::Array(vec![item; 100]);

    let response = h.app.clone().oneshot(json_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body_bytes(response).await;
    let pages = bytes
        .windows(b"/Type /Page\n".len())
        .filter(|window| *window == b"/Type /Page\n")
        .count();
    assert!(pages > 1);
    assert_eq!(h.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn fetch_returns_stored_document() {
    let h = harness();
    let generated = h.app.clone().oneshot(json_request(&sample_body())).await.unwrap();
    let generated_bytes = body_bytes(generated).await;

    let uri = format!("/api/pdf/{SAMPLE_FINGERPRINT}");
    let fetched = h.app.clone().oneshot(get_request(&uri)).await.unwrap();

    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(header_str(&fetched, CACHE_HEADER), "hit");
    assert_eq!(body_bytes(fetched).await, generated_bytes);
    assert_eq!(h.assembler.calls(), 1);
}

#[tokio::test]
async fn fetch_unknown_fingerprint_is_not_found() {
    let h = harness();
    let uri = format!("/api/pdf/{}", "00".repeat(32));
    let response = h.app.oneshot(get_request(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn fetch_malformed_fingerprint_is_bad_request() {
    let h = harness();
    let response = h.app.oneshot(get_request("/api/pdf/not-hex")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_fingerprint");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let h = harness();
    let response = h.app.oneshot(generate_request("{\"seller\":")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "malformed_request");
    assert_eq!(h.assembler.calls(), 0);
}

#[tokio::test]
async fn missing_field_is_bad_request() {
    let h = harness();
    let mut body = sample_body();
    body.as_object_mut().unwrap().remove("buyerGstin");

    let response = h.app.oneshot(json_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn control_character_is_rejected_without_storing() {
    let h = harness();
    let mut body = sample_body();
    body["seller"] = json!("XYZ\u{0007} Pvt. Ltd.");

    let response = h.app.oneshot(json_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "invalid_request");
    assert_eq!(h.assembler.calls(), 0);
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn unrenderable_character_is_rejected_without_storing() {
    let h = harness();
    let mut body = sample_body();
    body["buyerAddress"] = json!("\u{20B9} New Delhi");

    let response = h.app.oneshot(json_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["message"].as_str().unwrap().contains("buyer.address"));
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn unavailable_store_is_service_unavailable() {
    let state = AppState::new(
        Arc::new(UnavailableStore) as Arc<dyn ArtifactStore>,
        Arc::new(CountingAssembler::new()) as Arc<dyn Assembler>,
        CacheConfig::default(),
    );
    let app = router(state, BODY_LIMIT);

    let response = app.oneshot(json_request(&sample_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], "store_unavailable");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let h = harness();
    let response = h
        .app
        .oneshot(generate_request(vec![b' '; BODY_LIMIT + 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(h.assembler.calls(), 0);
}
