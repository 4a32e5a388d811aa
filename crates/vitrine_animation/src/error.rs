//! Animation error types

use thiserror::Error;
use vitrine_core::{CoreError, NodeId};

/// Faults raised by animation tasks
///
/// A frame loop that returns one of these is logged and removed from the
/// scheduler; other loops keep running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// The node an animation writes to was removed from the page
    #[error("animated node {0:?} was removed from the page")]
    NodeRemoved(NodeId),

    /// A frame loop panicked
    #[error("frame loop `{name}` panicked: {message}")]
    Panicked { name: String, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
