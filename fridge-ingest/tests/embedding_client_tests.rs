//! Embedding client tests against a local OpenAI-compatible server

mod helpers;

use fridge_ingest::db::{IngredientStore, SqliteIngredientStore};
use fridge_ingest::models::{IngestEvent, UploadFile};
use fridge_ingest::services::{
    EmbeddingError, EmbeddingProvider, IngestOutcome, IngestPipeline, OpenAiEmbeddingClient,
};
use helpers::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn client(base_url: &str, api_key: &str, dimensions: Option<usize>) -> OpenAiEmbeddingClient {
    OpenAiEmbeddingClient::new(
        api_key.to_string(),
        base_url,
        "text-embedding-3-small".to_string(),
        dimensions,
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn embed_posts_model_and_input() {
    let (base_url, captured) = spawn_fake_embedding_server().await;
    let client = client(&base_url, TEST_API_KEY, None);

    let vector = client.embed("Milk: Dairy").await.unwrap();

    assert_eq!(vector, vec![11.0, 1.0, 0.0]);
    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["model"], "text-embedding-3-small");
    assert_eq!(requests[0]["input"], "Milk: Dairy");
    assert!(requests[0].get("dimensions").is_none());
}

#[tokio::test]
async fn embed_sends_configured_dimensions() {
    let (base_url, captured) = spawn_fake_embedding_server().await;
    let client = client(&base_url, TEST_API_KEY, Some(256));

    client.embed("Tomato").await.unwrap();

    assert_eq!(captured.lock().unwrap()[0]["dimensions"], 256);
}

#[tokio::test]
async fn wrong_key_maps_to_invalid_api_key() {
    let (base_url, _captured) = spawn_fake_embedding_server().await;
    let client = client(&base_url, "sk-wrong", None);

    let err = client.embed("Tomato").await.unwrap_err();

    assert!(matches!(err, EmbeddingError::InvalidApiKey));
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let (base_url, _captured) = spawn_fake_embedding_server().await;
    let client = client(&base_url, TEST_API_KEY, None);

    let err = client.embed("FAIL please").await.unwrap_err();

    match err {
        EmbeddingError::ApiError(status, body) => {
            assert_eq!(status, 500);
            assert!(body.contains("model overloaded"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn response_without_vector_is_rejected() {
    let (base_url, _captured) = spawn_fake_embedding_server().await;
    let client = client(&base_url, TEST_API_KEY, None);

    let err = client.embed("EMPTY").await.unwrap_err();

    assert!(matches!(err, EmbeddingError::EmptyEmbedding));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{}/v1", addr), TEST_API_KEY, None);
    let err = client.embed("Tomato").await.unwrap_err();

    assert!(matches!(err, EmbeddingError::NetworkError(_)));
}

#[tokio::test]
async fn pipeline_with_http_client_isolates_api_failures() {
    let (base_url, captured) = spawn_fake_embedding_server().await;
    let pool = memory_pool().await;
    let store = Arc::new(SqliteIngredientStore::new(pool));
    let pipeline = IngestPipeline::new(
        Arc::new(client(&base_url, TEST_API_KEY, None)),
        store.clone(),
    );

    let csv = format!("{}Tomato,,,,\nFAIL,upstream breaks,,,\nMilk,Dairy,,7,90\n", CSV_HEADER);
    let (tx, mut rx) = mpsc::channel(16);
    let outcome = pipeline
        .run(Some(UploadFile::new(Some("a.csv".to_string()), csv.into_bytes())), tx)
        .await;

    let IngestOutcome::Completed(summary) = outcome else {
        panic!("expected completed run, got {:?}", outcome);
    };
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.failed_count, 1);
    assert!(summary.errors[0].starts_with("Row 2 (FAIL): Embedding API error 500"));

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(events.len(), 4);
    assert!(matches!(events.last(), Some(IngestEvent::Complete { .. })));

    assert_eq!(captured.lock().unwrap().len(), 3);

    let stored = store.list().await.unwrap();
    let names: Vec<&str> = stored.iter().map(|i| i.ingredient.as_str()).collect();
    assert_eq!(names, vec!["Tomato", "Milk"]);
    assert_eq!(stored[0].embedding, vec![6.0, 1.0, 0.0]);
}
