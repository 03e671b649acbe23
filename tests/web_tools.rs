//! Web tool integration tests against a local axum server standing in for
//! the search and fetch services.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use jeeves_tools::tools::{registry, FailureKind};
use jeeves_tools::types::WebServiceConfig;
use jeeves_tools::ToolContext;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// One request as the fake service saw it.
#[derive(Debug, Clone)]
struct Seen {
    authorization: Option<String>,
    accept: Option<String>,
    trace: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<Seen>>>,
}

impl Recorder {
    fn record(&self, headers: &HeaderMap, body: Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(Seen {
            authorization: header("authorization"),
            accept: header("accept"),
            trace: header("x-trace"),
            body,
        });
    }

    fn requests(&self) -> Vec<Seen> {
        self.requests.lock().unwrap().clone()
    }
}

async fn search(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorder.record(&headers, body);
    Json(json!({
        "search_results": [
            {
                "site_name": "Rust",
                "title": "The Rust Programming Language",
                "url": "https://www.rust-lang.org",
                "snippet": "A language empowering everyone",
                "content": "Full page text",
                "date": "2024-05-01"
            },
            {
                "title": "Tokio",
                "url": "https://tokio.rs",
                "snippet": "An asynchronous runtime"
            }
        ]
    }))
}

async fn fetch(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> String {
    recorder.record(&headers, body);
    "# Example\n\nBody text".to_string()
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

/// Helper: serve the fake services on a random port, return (base_url, recorder).
async fn start_fake_services() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/search", post(search))
        .route("/fetch", post(fetch))
        .route("/broken", post(broken))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorder)
}

#[tokio::test]
async fn search_sends_query_and_credentials() {
    let (base, recorder) = start_fake_services().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = ToolContext::new(dir.path()).unwrap().with_search_service(
        WebServiceConfig::new(format!("{base}/search"), "secret-key").with_header("X-Trace", "t-1"),
    );

    let out = registry::web_tools()
        .invoke(
            "search_web",
            &ctx,
            json!({"query": "rust async", "limit": 3, "include_content": true}),
        )
        .await;

    let success = out.success().expect("search should succeed");
    assert!(success.output.contains("Title: The Rust Programming Language"));
    assert!(success.output.contains("Date: 2024-05-01"));
    assert!(success.output.contains("Full page text"));
    assert!(success.output.contains("URL: https://tokio.rs"));
    assert_eq!(success.data.as_ref().unwrap()["results"].as_array().unwrap().len(), 2);

    let seen = recorder.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer secret-key"));
    assert_eq!(seen[0].trace.as_deref(), Some("t-1"));
    assert_eq!(seen[0].body["text_query"], "rust async");
    assert_eq!(seen[0].body["limit"], 3);
    assert_eq!(seen[0].body["enable_page_crawling"], true);
}

#[tokio::test]
async fn fetch_returns_page_text() {
    let (base, recorder) = start_fake_services().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = ToolContext::new(dir.path())
        .unwrap()
        .with_fetch_service(WebServiceConfig::new(format!("{base}/fetch"), "fetch-key"));

    let out = registry::web_tools()
        .invoke("fetch_url", &ctx, json!({"url": "https://example.com/page"}))
        .await;

    let success = out.success().expect("fetch should succeed");
    assert_eq!(success.output, "# Example\n\nBody text");
    assert_eq!(
        success.message.as_deref(),
        Some("The returned content is the main text content extracted from the page.")
    );

    let seen = recorder.requests();
    assert_eq!(seen[0].body, json!({"url": "https://example.com/page"}));
    assert_eq!(seen[0].accept.as_deref(), Some("text/markdown"));
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer fetch-key"));
}

#[tokio::test]
async fn service_error_status_is_network_failure() {
    let (base, _recorder) = start_fake_services().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = ToolContext::new(dir.path())
        .unwrap()
        .with_fetch_service(WebServiceConfig::new(format!("{base}/broken"), "k"));

    let out = registry::web_tools()
        .invoke("fetch_url", &ctx, json!({"url": "https://example.com/page"}))
        .await;

    let failure = out.failure().expect("fetch should fail");
    assert_eq!(failure.kind, FailureKind::Network);
    assert!(failure.message.contains("500"));
    assert!(failure.message.contains("upstream exploded"));
}

#[tokio::test]
async fn unreachable_service_is_network_failure() {
    // Bind temporarily to get a free port, then drop immediately
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let ctx = ToolContext::new(dir.path())
        .unwrap()
        .with_search_service(WebServiceConfig::new(format!("http://{addr}/search"), "k"));

    let out = registry::web_tools()
        .invoke("search_web", &ctx, json!({"query": "anything"}))
        .await;

    assert_eq!(out.failure().unwrap().kind, FailureKind::Network);
}

#[tokio::test]
async fn missing_configuration_fails_before_any_request() {
    let (base, recorder) = start_fake_services().await;
    let dir = tempfile::tempdir().unwrap();
    // Only fetch is configured; search must fail without touching the network.
    let ctx = ToolContext::new(dir.path())
        .unwrap()
        .with_fetch_service(WebServiceConfig::new(format!("{base}/fetch"), "k"));

    let out = registry::web_tools()
        .invoke("search_web", &ctx, json!({"query": "rust"}))
        .await;

    let failure = out.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Configuration);
    assert_eq!(failure.message, "search service is not configured");
    assert!(recorder.requests().is_empty());
}
