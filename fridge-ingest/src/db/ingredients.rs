//! Ingredient table operations
//!
//! The ingest pipeline only needs `insert`; listing, deletion and counting
//! back the admin endpoints and the health check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;
use fridge_common::{Error, Result};

use crate::models::{Ingredient, IngredientRecord};

/// Persistent ingredient storage
#[async_trait]
pub trait IngredientStore: Send + Sync {
    /// Insert one record as a single atomic write, returning its new id
    async fn insert(&self, record: &IngredientRecord) -> Result<Uuid>;

    /// All ingredients, oldest first
    async fn list(&self) -> Result<Vec<Ingredient>>;

    /// Delete by id; [`Error::NotFound`] when no such row exists
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn count(&self) -> Result<u64>;
}

/// [`IngredientStore`] backed by the `ingredients` SQLite table
#[derive(Clone)]
pub struct SqliteIngredientStore {
    pool: SqlitePool,
}

impl SqliteIngredientStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngredientStore for SqliteIngredientStore {
    async fn insert(&self, record: &IngredientRecord) -> Result<Uuid> {
        // Prepare all data BEFORE acquiring database connection
        let id = Uuid::new_v4();
        let embedding = serde_json::to_string(&record.embedding)
            .map_err(|e| Error::Internal(format!("Failed to serialize embedding: {}", e)))?;
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO ingredients (
                id, ingredient, description,
                pantry_days, fridge_days, freezer_days,
                embedding, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&record.row.ingredient)
        .bind(&record.row.description)
        .bind(record.row.pantry_days.map(i64::from))
        .bind(record.row.fridge_days.map(i64::from))
        .bind(record.row.freezer_days.map(i64::from))
        .bind(&embedding)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(ingredient_id = %id, ingredient = %record.row.ingredient, "Ingredient inserted");

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Ingredient>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ingredient, description,
                   pantry_days, fridge_days, freezer_days,
                   embedding, created_at
            FROM ingredients
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(ingredient_from_row).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Ingredient not found: {}", id)));
        }

        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

fn ingredient_from_row(row: &SqliteRow) -> Result<Ingredient> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse ingredient id: {}", e)))?;

    let embedding: String = row.get("embedding");
    let embedding: Vec<f32> = serde_json::from_str(&embedding)
        .map_err(|e| Error::Internal(format!("Failed to deserialize embedding: {}", e)))?;

    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Failed to parse created_at: {}", e)))?
        .with_timezone(&Utc);

    Ok(Ingredient {
        id,
        ingredient: row.get("ingredient"),
        description: row.get("description"),
        pantry_days: days_column(row, "pantry_days")?,
        fridge_days: days_column(row, "fridge_days")?,
        freezer_days: days_column(row, "freezer_days")?,
        embedding,
        created_at,
    })
}

fn days_column(row: &SqliteRow, column: &str) -> Result<Option<u32>> {
    let value: Option<i64> = row.get(column);
    value
        .map(|days| {
            u32::try_from(days)
                .map_err(|_| Error::Internal(format!("{} out of range: {}", column, days)))
        })
        .transpose()
}
