//! Error types for the table matching engine.

use thiserror::Error;

/// Hard failures of a matching run.
///
/// Missing or unmatched borders are never reported here: they degrade into
/// synthesised borders recorded in the cell provenance instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("no table template provided")]
    NoTemplate,

    #[error("table template has no cells")]
    EmptyTemplate,

    #[error("invalid table template: {0}")]
    InvalidTemplate(String),

    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience Result type alias for MatchError.
pub type Result<T> = std::result::Result<T, MatchError>;
