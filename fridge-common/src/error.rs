//! Error type shared by Fridgenator crates
//!
//! Covers the failures of code that lives below the HTTP layer: the
//! ingredient database, the data folder and bootstrap configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Creating the data folder failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable TOML or a missing required setting (e.g. the embedding key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No stored row with the requested id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data that cannot be decoded or encoded
    #[error("Internal error: {0}")]
    Internal(String),
}
