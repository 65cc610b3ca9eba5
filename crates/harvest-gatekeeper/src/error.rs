//! Gatekeeper error types

use crate::validator::RejectionReason;
use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatekeeperError {
    /// Well-formed JSON that does not conform to the schema
    #[error(
        "Record does not match schema '{schema}': {}",
        summarize(.reasons)
    )]
    Rejected {
        /// Schema the record was checked against
        schema: String,
        /// Every violation found
        reasons: Vec<RejectionReason>,
        /// Bounded excerpt of the offending JSON
        excerpt: String,
    },
}

impl GatekeeperError {
    /// Violations carried by this error
    pub fn reasons(&self) -> &[RejectionReason] {
        match self {
            GatekeeperError::Rejected { reasons, .. } => reasons,
        }
    }
}

fn summarize(reasons: &[RejectionReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
