//! HTTP API handlers for fridge-ingest
//!
//! REST endpoints plus the SSE progress stream returned by uploads

pub mod health;
pub mod ingredients;

pub use health::health_routes;
pub use ingredients::ingredient_routes;
