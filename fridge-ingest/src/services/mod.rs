//! Service modules for ingredient ingest
//!
//! - CSV parsing and row validation
//! - Embedding API client
//! - Sequential ingest pipeline streaming progress to the caller

pub mod csv_parser;
pub mod embedding_client;
pub mod ingest_pipeline;

pub use csv_parser::{parse_upload, CsvRow, ParseError, ValidationError};
pub use embedding_client::{EmbeddingError, EmbeddingProvider, OpenAiEmbeddingClient};
pub use ingest_pipeline::{rejected_stream, IngestOutcome, IngestPipeline, RowFailure, NO_FILE_MESSAGE};
