//! Error types for holding construction and portfolio evolution

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for valuation and evolution operations
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while building holdings or evolutions.
///
/// Valuation itself never fails: once a holding exists, `value_at` and
/// `project_to` are total over every date.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Evolution range with start after end
    #[error("Invalid evolution range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A holding constructor invariant does not hold
    #[error("Invalid holding '{name}': {reason}")]
    InvalidHolding { name: String, reason: String },

    /// A flow was registered on a balance it does not target
    #[error("Flow '{flow}' does not target cash balance '{balance}'")]
    FlowTargetMismatch { flow: String, balance: String },
}

impl ProjectionError {
    pub(crate) fn invalid_holding(name: &str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidHolding {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
