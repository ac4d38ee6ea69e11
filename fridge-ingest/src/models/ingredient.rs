//! Ingredient reference data
//!
//! An [`IngredientRow`] is what one CSV data row yields after validation. It
//! becomes an [`IngredientRecord`] once an embedding has been generated, and
//! an [`Ingredient`] once the store has assigned it an id.

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uploaded tabular file, held only for the duration of one request
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Client-supplied file name, if any
    pub file_name: Option<String>,
    /// Raw file content
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(file_name: Option<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name,
            content: content.into(),
        }
    }
}

/// Validated ingredient candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRow {
    pub ingredient: String,
    pub description: Option<String>,
    /// Shelf life at room temperature, in days
    pub pantry_days: Option<u32>,
    /// Shelf life refrigerated, in days
    pub fridge_days: Option<u32>,
    /// Shelf life frozen, in days
    pub freezer_days: Option<u32>,
}

impl IngredientRow {
    /// Text submitted to the embedding provider
    ///
    /// `ingredient` alone, or `ingredient: description` when a description exists.
    pub fn embedding_text(&self) -> String {
        match self.description.as_deref() {
            Some(description) if !description.is_empty() => {
                format!("{}: {}", self.ingredient, description)
            }
            _ => self.ingredient.clone(),
        }
    }
}

/// Ingredient ready to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    #[serde(flatten)]
    pub row: IngredientRow,
    pub embedding: Vec<f32>,
}

impl IngredientRecord {
    pub fn new(row: IngredientRow, embedding: Vec<f32>) -> Self {
        Self { row, embedding }
    }
}

/// Persisted ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub ingredient: String,
    pub description: Option<String>,
    pub pantry_days: Option<u32>,
    pub fridge_days: Option<u32>,
    pub freezer_days: Option<u32>,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}
