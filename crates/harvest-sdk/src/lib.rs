//! Harvest Rust SDK
//!
//! Turns a URL and a schema into a validated record: fetch the page, ask the
//! model for a record, validate it, and fall back to a headless browser when
//! the plain HTTP response was not enough.
//!
//! # Example
//!
//! ```no_run
//! use harvest_domain::{Field, FieldType, Schema};
//! use harvest_llm::OllamaProvider;
//! use harvest_sdk::{Harvester, HarvesterConfig, ScrapeOptions};
//!
//! # async fn example() -> Result<(), harvest_sdk::SdkError> {
//! let schema = Schema::builder("Story")
//!     .field(Field::required("title", FieldType::String).with_description("Headline of the top story"))
//!     .field(Field::optional("points", FieldType::Integer).with_description("Upvote count"))
//!     .build()
//!     .expect("valid schema");
//!
//! let provider = OllamaProvider::default_endpoint("qwen2.5:7b");
//! let harvester = Harvester::new(provider, HarvesterConfig::default())?;
//!
//! let response = harvester
//!     .scrape("https://news.ycombinator.com", &schema, &ScrapeOptions::default())
//!     .await?;
//! println!("{}", response);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod harvester;
mod response;

pub use config::{AcquisitionConfig, HarvesterConfig};
pub use error::SdkError;
pub use harvester::{Harvester, MIN_RENDERED_HTML_CHARS};
pub use response::{AcquisitionStrategy, ScrapeOptions, ScrapeResponse};
