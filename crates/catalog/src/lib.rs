//! Static tool catalog for the building assistant.
//!
//! Core principle: **every tool declares the exact shape of its arguments.**
//! Arguments the model produces are checked against that shape before any
//! process is spawned on their behalf.

mod catalog;
mod error;
mod schema;

pub use catalog::{Catalog, PREPROCESS_TOOL};
pub use error::{Error, Result};
pub use schema::{Field, FieldType, ToolSchema};
