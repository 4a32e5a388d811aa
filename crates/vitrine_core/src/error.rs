//! Core error types

use crate::page::NodeId;
use thiserror::Error;

/// Errors raised by the page model and its helpers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Selector text could not be parsed
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    /// A node handle no longer refers to a live node
    #[error("node {0:?} is not part of the page")]
    MissingNode(NodeId),

    /// An attribute was present but held an unusable value
    #[error("invalid value `{value}` for attribute `{attribute}`")]
    InvalidAttribute { attribute: String, value: String },

    /// A required attribute was absent
    #[error("missing attribute `{0}`")]
    MissingAttribute(String),

    /// Root margin text could not be parsed
    #[error("invalid root margin `{0}`")]
    RootMargin(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
