// End-to-end tests for the HTTP API against a seeded in-memory SQLite store
#![cfg(feature = "server")]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use voice_bot::api::create_router;
use voice_bot::config::ServerConfig;
use voice_bot::{Faq, KnowledgeStore, QueryProcessor, SqliteStore, UserAccount};

fn seeded_app() -> Router {
    let store = SqliteStore::open_in_memory().unwrap();
    store.setup().unwrap();
    store.seed_demo_data().unwrap();

    let processor = QueryProcessor::new(Arc::new(store));
    create_router(Arc::new(processor), &ServerConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn ask(app: Router, text: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/process-query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "text": text }).to_string()))
        .unwrap();
    send(app, request).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_reports_version() {
    let (status, body) = send(seeded_app(), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Voice Bot API is running");
    assert_eq!(body["version"], voice_bot::VERSION);
}

#[tokio::test]
async fn test_balance_for_default_user() {
    let (status, body) = ask(seeded_app(), "what is my balance").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "check_balance");
    assert_eq!(
        body["response_text"],
        "Your account balance for demo_user (Account: ACC-1001) is $1250.75."
    );
    assert_eq!(body["action_taken"], "Retrieved account balance from database");
}

#[tokio::test]
async fn test_balance_for_unknown_account() {
    let (status, body) = ask(seeded_app(), "balance for account bob").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "check_balance");
    assert_eq!(
        body["response_text"],
        "I couldn't find your account. Please provide your username or account number."
    );
    assert_eq!(body["action_taken"], "Account lookup failed");
}

#[tokio::test]
async fn test_balance_wins_over_pricing() {
    let (_, body) = ask(seeded_app(), "how much is the pricing for my plan").await;
    assert_eq!(body["intent"], "check_balance");
}

#[tokio::test]
async fn test_faq_answer_and_fallback() {
    let (status, body) = ask(seeded_app(), "what is the refund policy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "general_query");
    assert_eq!(body["action_taken"], "Matched FAQ from database");
    assert!(body["response_text"].as_str().unwrap().contains("full refund"));

    let (status, body) = ask(seeded_app(), "tell me a joke").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "general_query");
    assert_eq!(body["action_taken"], "No match found, provided general help");
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    for text in ["", "   ", "\n\t"] {
        let (status, body) = ask(seeded_app(), text).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "text: {text:?}");
        assert_eq!(body["detail"], "Query text cannot be empty");
    }
}

#[tokio::test]
async fn test_stats_counts_rows() {
    let (status, body) = send(seeded_app(), get("/api/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total_faqs": 5, "total_users": 3 }));
}

#[tokio::test]
async fn test_store_without_schema_is_server_error() {
    // setup() is never called, so every table lookup fails
    let store = SqliteStore::open_in_memory().unwrap();
    let processor = QueryProcessor::new(Arc::new(store));
    let app = create_router(Arc::new(processor), &ServerConfig::default());

    let (status, body) = ask(app.clone(), "what is my balance").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing query:"));
    assert!(detail.contains("no such table"), "detail: {detail}");

    let (status, body) = send(app.clone(), get("/api/stats")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("no such table"));

    // Canned answers need no store
    let (status, body) = ask(app, "what are your hours").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "get_hours");
}

#[tokio::test]
async fn test_imported_rows_are_used() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.setup().unwrap();
    store
        .insert_account(&UserAccount::new("carol", "ACC-7", 3.14159))
        .unwrap();
    store
        .insert_faq(&Faq {
            id: 0,
            question: None,
            keywords: "gift, voucher".to_string(),
            answer: "Gift cards are sold online.".to_string(),
        })
        .unwrap();
    assert_eq!(store.count_faqs().unwrap(), 1);

    let processor = QueryProcessor::new(Arc::new(store));
    let app = create_router(Arc::new(processor), &ServerConfig::default());

    let (_, body) = ask(app.clone(), "funds for username carol").await;
    assert_eq!(
        body["response_text"],
        "Your account balance for carol (Account: ACC-7) is $3.14."
    );

    let (_, body) = ask(app, "do you sell a gift voucher").await;
    assert_eq!(body["response_text"], "Gift cards are sold online.");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/process-query")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = seeded_app().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}
