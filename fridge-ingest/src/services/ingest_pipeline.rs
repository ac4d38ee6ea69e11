//! Ingredient ingest pipeline
//!
//! Upload → parse rows → for each row: progress event, validate, embed,
//! insert → one `complete` summary. Rows run strictly one after another in
//! file order, and a row failure is recorded in the summary without touching
//! any other row.
//!
//! Request-level failures (no file, undecodable CSV, broken row accounting,
//! a panicking pipeline task) end the stream with a single `error` event and
//! no summary.
//!
//! # Disconnects
//! The pipeline runs on its own task, so a client that goes away never
//! interrupts the row in flight: its embedding call and insert complete.
//! The next progress send then fails and no further rows are attempted.

use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::db::IngredientStore;
use crate::models::{IngestEvent, IngredientRecord, ResultSummary, UploadFile};
use crate::services::csv_parser::{self, CsvRow, ValidationError};
use crate::services::embedding_client::{EmbeddingError, EmbeddingProvider};

/// Message sent when the request carried no file
pub const NO_FILE_MESSAGE: &str = "No file provided";

/// Why a single row was not stored
#[derive(Debug, Error)]
pub enum RowFailure {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] fridge_common::Error),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Summary was produced (individual rows may still have failed)
    Completed(ResultSummary),
    /// Request-level failure, reported as an `error` event
    Failed(String),
    /// Client disconnected; `attempted` rows were started before stopping
    Abandoned { attempted: usize },
}

/// Sequential CSV → embedding → store pipeline
#[derive(Clone)]
pub struct IngestPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn IngredientStore>,
}

impl IngestPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn IngredientStore>) -> Self {
        Self { embedder, store }
    }

    /// Run on a background task and return the event stream
    ///
    /// The receiver yields events as they are produced and closes after the
    /// terminal event. A panic inside the pipeline task is reported as a
    /// single `error` event.
    pub fn spawn(&self, upload: Option<UploadFile>, capacity: usize) -> mpsc::Receiver<IngestEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let guard_tx = tx.clone();
        let pipeline = self.clone();

        let worker = tokio::spawn(async move { pipeline.run(upload, tx).await });

        tokio::spawn(async move {
            match worker.await {
                Ok(outcome) => debug!(?outcome, "Ingest task finished"),
                Err(e) => {
                    error!(error = %e, "Ingest task aborted");
                    let _ = guard_tx
                        .send(IngestEvent::error(format!("Ingest aborted: {}", e)))
                        .await;
                }
            }
        });

        rx
    }

    /// Process one upload, sending every event to `events`
    pub async fn run(
        &self,
        upload: Option<UploadFile>,
        events: mpsc::Sender<IngestEvent>,
    ) -> IngestOutcome {
        let Some(upload) = upload else {
            return fail(&events, NO_FILE_MESSAGE).await;
        };

        let rows = match csv_parser::parse_upload(&upload.content) {
            Ok(rows) => rows,
            Err(e) => return fail(&events, e.to_string()).await,
        };

        let total = rows.len();
        info!(
            file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
            bytes = upload.content.len(),
            total,
            "Starting ingredient ingest"
        );

        let mut summary = ResultSummary::default();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;

            // Progress is reported when a row starts, before its outcome is known
            if events
                .send(IngestEvent::progress(row_number, total))
                .await
                .is_err()
            {
                warn!(
                    attempted = index,
                    total,
                    "Client disconnected, stopping ingest before row {}",
                    row_number
                );
                return IngestOutcome::Abandoned { attempted: index };
            }

            match self.process_row(row).await {
                Ok(id) => {
                    debug!(row = row_number, ingredient_id = %id, "Row stored");
                    summary.record_success();
                }
                Err(failure) => {
                    let diagnostic = row_diagnostic(row_number, row.name(), &failure);
                    warn!(row = row_number, "{}", diagnostic);
                    summary.record_failure(diagnostic);
                }
            }
        }

        if summary.processed() != total {
            return fail(
                &events,
                format!(
                    "Row accounting mismatch: {} succeeded + {} failed != {} rows",
                    summary.success_count, summary.failed_count, total
                ),
            )
            .await;
        }

        info!(
            total,
            success = summary.success_count,
            failed = summary.failed_count,
            "Ingredient ingest completed"
        );

        if events
            .send(IngestEvent::Complete {
                results: summary.clone(),
            })
            .await
            .is_err()
        {
            warn!("Client disconnected before the ingest summary was delivered");
        }

        IngestOutcome::Completed(summary)
    }

    /// Validate, embed and store one row
    async fn process_row(&self, row: &CsvRow) -> Result<Uuid, RowFailure> {
        let ingredient = row.validate()?;

        let embedding = self.embedder.embed(&ingredient.embedding_text()).await?;
        if embedding.is_empty() {
            return Err(EmbeddingError::EmptyEmbedding.into());
        }

        let record = IngredientRecord::new(ingredient, embedding);
        Ok(self.store.insert(&record).await?)
    }
}

/// Event stream carrying only a request-level error
pub fn rejected_stream(message: impl Into<String>) -> mpsc::Receiver<IngestEvent> {
    let message = message.into();
    warn!(error = %message, "Rejecting ingredient upload");

    let (tx, rx) = mpsc::channel(1);
    // Fresh channel with capacity 1 always has room
    let _ = tx.try_send(IngestEvent::error(message));
    rx
}

/// `Row N (name): reason`, or `Row N: reason` when the name is unknown
fn row_diagnostic(row_number: usize, name: Option<&str>, failure: &impl Display) -> String {
    match name {
        Some(name) => format!("Row {} ({}): {}", row_number, name, failure),
        None => format!("Row {}: {}", row_number, failure),
    }
}

async fn fail(events: &mpsc::Sender<IngestEvent>, message: impl Into<String>) -> IngestOutcome {
    let message = message.into();
    error!(error = %message, "Ingredient ingest failed");
    let _ = events.send(IngestEvent::error(message.clone())).await;
    IngestOutcome::Failed(message)
}
