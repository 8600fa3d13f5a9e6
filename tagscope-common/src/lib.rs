//! # Tagscope Common Library
//!
//! Shared code for the tagscope validation tools including:
//! - The fixed event field schema
//! - The `EventRecord` model and validation result types
//! - Error types
//! - Configuration loading

pub mod config;
pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
pub use model::EventRecord;
