//! Harvest Domain Layer
//!
//! Core model shared by every other Harvest crate: the extraction schema, the
//! validated record an extraction produces, and the trait boundary to the
//! generative model.
//!
//! ## Key Concepts
//!
//! - **Schema**: a named, ordered set of typed fields describing the record to extract
//! - **ExtractionResult**: a record that has been validated against a schema
//! - **Prompt**: the system/user instruction pair sent to the model
//! - **LlmProvider**: the black-box text generator ("oracle")
//!
//! ## Architecture
//!
//! - Pure data types and trait definitions only
//! - Infrastructure implementations (model adapters, validation, fetching) live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record;
pub mod schema;
pub mod text;
pub mod traits;

// Re-exports for convenience
pub use record::ExtractionResult;
pub use schema::{Field, FieldType, Schema, SchemaBuilder, SchemaError};
pub use traits::{GenerationOptions, LlmProvider, Prompt};
