//! fridge-ingest library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use fridge_common::config::IngestConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::{IngredientStore, SqliteIngredientStore};
use crate::services::{EmbeddingProvider, IngestPipeline};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Ingredient table access
    pub store: Arc<dyn IngredientStore>,
    /// Upload pipeline (shares `store`)
    pub pipeline: IngestPipeline,
    /// Upload stream tuning
    pub ingest: IngestConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State backed by the SQLite ingredient table
    pub fn new(db: SqlitePool, embedder: Arc<dyn EmbeddingProvider>, ingest: IngestConfig) -> Self {
        Self::with_store(Arc::new(SqliteIngredientStore::new(db)), embedder, ingest)
    }

    pub fn with_store(
        store: Arc<dyn IngredientStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        ingest: IngestConfig,
    ) -> Self {
        Self {
            pipeline: IngestPipeline::new(embedder, store.clone()),
            store,
            ingest,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.ingest.max_upload_bytes;

    Router::new()
        .merge(api::ingredient_routes(max_upload_bytes))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
