//! Data models for fridge-ingest (Ingredient Ingest service)
//!
//! - Ingredient rows parsed from uploads and the records persisted from them
//! - Events streamed back to the uploading client

pub mod ingest_event;
pub mod ingredient;

pub use ingest_event::{IngestEvent, ResultSummary};
pub use ingredient::{Ingredient, IngredientRecord, IngredientRow, UploadFile};
