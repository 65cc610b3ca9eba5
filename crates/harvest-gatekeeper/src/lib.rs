//! Harvest Gatekeeper
//!
//! Validates model output against an extraction schema before it becomes an
//! [`ExtractionResult`](harvest_domain::ExtractionResult).
//!
//! The Gatekeeper provides:
//! - Required-field and type checking, reported per field path
//! - Lenient scalar coercion (`"42"` for an integer field, `"true"` for a boolean)
//! - Normalization: optional fields the model left out are filled with `null`
//!
//! # Examples
//!
//! ```
//! use harvest_domain::{Field, FieldType, Schema};
//! use harvest_gatekeeper::Gatekeeper;
//! use serde_json::json;
//!
//! let schema = Schema::builder("Story")
//!     .field(Field::required("title", FieldType::String))
//!     .field(Field::optional("points", FieldType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let gatekeeper = Gatekeeper::default_config();
//! let record = gatekeeper.validate(&json!({"title": "Hello", "points": "12"}), &schema).unwrap();
//! assert_eq!(record.get("points"), Some(&json!(12)));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use validator::{Gatekeeper, RejectionReason};
