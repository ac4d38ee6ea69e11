//! Database access for fridge-ingest
//!
//! SQLite database in the root folder holding the ingredient reference table.

pub mod ingredients;

pub use ingredients::{IngredientStore, SqliteIngredientStore};

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Creates the database file if missing and ensures the schema exists.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create fridge-ingest tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> fridge_common::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ingredients (
            id TEXT PRIMARY KEY,
            ingredient TEXT NOT NULL,
            description TEXT,
            pantry_days INTEGER,
            fridge_days INTEGER,
            freezer_days INTEGER,
            embedding TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (ingredients)");

    Ok(())
}
