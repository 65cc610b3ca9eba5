//! Command implementations.

pub mod analyze;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod scrape;

pub use self::analyze::execute_analyze;
pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::fetch::execute_fetch;
pub use self::scrape::execute_scrape;

use crate::error::{CliError, Result};
use harvest_domain::Schema;
use std::fs;
use std::path::Path;

/// Read a JSON Schema document from `path`.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let contents = fs::read_to_string(path)?;
    let document: serde_json::Value = serde_json::from_str(&contents)?;
    if !document.is_object() {
        return Err(CliError::InvalidInput(format!(
            "{} is not a JSON Schema object",
            path.display()
        )));
    }
    Ok(Schema::from_json_schema(&document)?)
}

/// Read an HTML file, rejecting empty ones.
pub fn load_html(path: &Path) -> Result<String> {
    let html = fs::read_to_string(path)?;
    if html.trim().is_empty() {
        return Err(CliError::InvalidInput(format!("{} is empty", path.display())));
    }
    Ok(html)
}
