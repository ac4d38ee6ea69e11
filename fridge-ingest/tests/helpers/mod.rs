//! Test Helper Utilities
//!
//! Shared utilities for testing fridge-ingest: app state with an in-memory
//! database, a scripted embedding provider, a fake OpenAI-compatible server,
//! multipart request bodies and SSE body decoding.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    routing::post,
    Json, Router,
};
use fridge_common::config::IngestConfig;
use fridge_ingest::models::IngestEvent;
use fridge_ingest::services::{EmbeddingError, EmbeddingProvider};
use fridge_ingest::AppState;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "fridge-test-boundary";
pub const TEST_API_KEY: &str = "sk-test";
pub const CSV_HEADER: &str = "ingredient,description,pantry_days,fridge_days,freezer_days\n";

/// Embedding provider that fails for texts starting with `fail_prefix`
#[derive(Default)]
pub struct ScriptedEmbedder {
    pub calls: Mutex<Vec<String>>,
    pub fail_prefix: Option<String>,
}

impl ScriptedEmbedder {
    pub fn failing_for(prefix: &str) -> Self {
        Self {
            fail_prefix: Some(prefix.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(prefix) = &self.fail_prefix {
            if text.starts_with(prefix.as_str()) {
                return Err(EmbeddingError::NetworkError("connection reset".to_string()));
            }
        }
        Ok(vec![text.len() as f32, 0.5, -0.5])
    }
}

/// Single-connection in-memory database with the fridge-ingest schema
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    fridge_ingest::db::init_tables(&pool).await.unwrap();
    pool
}

/// App state over an in-memory database and the given embedder
pub async fn test_app_state(embedder: Arc<dyn EmbeddingProvider>) -> (AppState, SqlitePool) {
    let pool = memory_pool().await;
    let state = AppState::new(pool.clone(), embedder, IngestConfig::default());
    (state, pool)
}

/// multipart/form-data body with one file field
pub fn multipart_file_body(field: &str, file_name: &str, content: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        file_name = file_name,
        content = content,
    )
}

/// multipart/form-data body with one plain text field
pub fn multipart_text_body(field: &str, value: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        value = value,
    )
}

/// POST /api/ingredients with a multipart body
pub fn upload_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/ingredients")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Decode every `data:` line of an SSE body, ignoring keep-alive comments
pub fn parse_sse_events(body: &[u8]) -> Vec<IngestEvent> {
    String::from_utf8_lossy(body)
        .split("\n\n")
        .filter_map(|chunk| chunk.trim_start_matches('\n').strip_prefix("data: "))
        .map(|payload| serde_json::from_str(payload).unwrap())
        .collect()
}

/// Requests captured by the fake embedding server
pub type CapturedRequests = Arc<Mutex<Vec<Value>>>;

/// Start an OpenAI-compatible embeddings endpoint on an ephemeral port
///
/// - wrong bearer token → 401
/// - input containing `FAIL` → 500 with an error body
/// - input containing `EMPTY` → 200 with no vectors
/// - otherwise → 200 with `[len(input), 1.0, 0.0]`
///
/// Returns the base URL (ending in `/v1`) and the captured request bodies.
pub async fn spawn_fake_embedding_server() -> (String, CapturedRequests) {
    let captured: CapturedRequests = Arc::new(Mutex::new(Vec::new()));
    let captured_for_handler = captured.clone();

    let app = Router::new().route(
        "/v1/embeddings",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let captured = captured_for_handler.clone();
            async move {
                captured.lock().unwrap().push(request.clone());

                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer sk-test");
                if !authorized {
                    return (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"error": {"message": "Incorrect API key provided"}})),
                    );
                }

                let input = request["input"].as_str().unwrap_or_default().to_string();
                if input.contains("FAIL") {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": {"message": "model overloaded"}})),
                    );
                }
                if input.contains("EMPTY") {
                    return (StatusCode::OK, Json(json!({"object": "list", "data": []})));
                }

                (
                    StatusCode::OK,
                    Json(json!({
                        "object": "list",
                        "data": [{
                            "object": "embedding",
                            "index": 0,
                            "embedding": [input.len() as f32, 1.0, 0.0]
                        }],
                        "model": request["model"],
                    })),
                )
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1", addr), captured)
}
