//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accept numeric strings for number fields, integral floats for integer
    /// fields, and common spellings ("yes", "0", ...) for boolean fields
    pub coerce_scalars: bool,

    /// Silently drop keys the schema does not declare instead of rejecting
    pub allow_unknown_fields: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            coerce_scalars: true,
            allow_unknown_fields: true,
        }
    }
}

impl ValidationConfig {
    /// Exact types only, no undeclared keys
    pub fn strict() -> Self {
        Self {
            coerce_scalars: false,
            allow_unknown_fields: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.coerce_scalars);
        assert!(config.allow_unknown_fields);
    }

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert!(!config.coerce_scalars);
        assert!(!config.allow_unknown_fields);
    }
}
