//! Ingredient API handlers
//!
//! POST /api/ingredients, GET /api/ingredients, DELETE /api/ingredients/:id

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Ingredient, UploadFile},
    services::rejected_stream,
    AppState,
};

/// Multipart field holding the CSV file
pub const UPLOAD_FIELD: &str = "file";

/// GET /api/ingredients response
#[derive(Debug, Serialize)]
pub struct IngredientListResponse {
    pub items: Vec<Ingredient>,
}

/// DELETE /api/ingredients/:id response
#[derive(Debug, Serialize)]
pub struct DeleteIngredientResponse {
    pub success: bool,
}

/// POST /api/ingredients
///
/// Accepts a multipart upload with a `file` field and answers with a
/// `text/event-stream` of `progress` events followed by one `complete`
/// event. A missing file or an unreadable body produces a single `error`
/// event instead. The status is always 200; failures travel in the stream.
pub async fn upload_ingredients(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let events = match read_upload(multipart).await {
        Ok(upload) => state.pipeline.spawn(upload, state.ingest.channel_capacity),
        Err(message) => rejected_stream(message),
    };

    let keep_alive = Duration::from_secs(state.ingest.keep_alive_secs.max(1));
    let sse = fridge_common::sse::channel_sse_stream(events, keep_alive);

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    )
        .into_response()
}

/// Pull the `file` field out of the multipart body
///
/// `Ok(None)` when the body is valid but carries no such field.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<UploadFile>, String> {
    let mut multipart = multipart.map_err(|e| format!("Invalid upload: {}", e))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read upload: {}", e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to read upload: {}", e))?;

        tracing::info!(
            file_name = file_name.as_deref().unwrap_or("<unnamed>"),
            bytes = content.len(),
            "Ingredient upload received"
        );

        return Ok(Some(UploadFile::new(file_name, content)));
    }

    Ok(None)
}

/// GET /api/ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
) -> ApiResult<Json<IngredientListResponse>> {
    let items = state.store.list().await?;
    tracing::debug!(count = items.len(), "Listed ingredients");
    Ok(Json(IngredientListResponse { items }))
}

/// DELETE /api/ingredients/:id
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteIngredientResponse>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid ingredient id: {}", id)))?;

    state.store.delete(id).await?;

    tracing::info!(ingredient_id = %id, "Ingredient deleted");

    Ok(Json(DeleteIngredientResponse { success: true }))
}

/// Build ingredient routes
pub fn ingredient_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/api/ingredients",
            get(list_ingredients).post(upload_ingredients),
        )
        .route("/api/ingredients/:id", delete(delete_ingredient))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
