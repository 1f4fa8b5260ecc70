//! Error types for the explore crate.

use thiserror::Error;

/// Errors produced by design-space exploration.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExploreError {
    /// No options were supplied.
    #[error("Option set is empty: nothing to explore")]
    EmptyOptionSet,

    /// An option carries a NaN or infinite score.
    #[error("Option '{option}' has non-finite score {score}")]
    InvalidScore {
        /// The offending option identifier.
        option: String,
        /// The score as supplied.
        score: f64,
    },

    /// Explorer parameters are out of range.
    #[error("Invalid explorer configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for exploration.
pub type ExploreResult<T> = Result<T, ExploreError>;
