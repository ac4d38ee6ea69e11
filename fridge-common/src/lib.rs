//! # Fridgenator Common Library
//!
//! Shared code for Fridgenator services:
//! - Error type
//! - Bootstrap configuration and root folder resolution
//! - Server-Sent Events framing

pub mod config;
pub mod error;
pub mod sse;

pub use error::{Error, Result};
