//! Array-layer error types
//!
//! Every variant is raised eagerly at the facade boundary, before any opcode
//! is dispatched. Engine-side contract violations propagate as
//! [`ArrayError::Engine`] and are not retried; a partially completed
//! multi-party protocol cannot be safely resumed.

use secretnum_engine::EngineError;
use thiserror::Error;

use crate::shape::Shape;

#[derive(Error, Debug)]
pub enum ArrayError {
    #[error("Construction error: {reason}")]
    Construction { reason: String },

    #[error("Index error: {reason}")]
    Index { reason: String },

    #[error("Shape mismatch: {left} and {right}")]
    ShapeMismatch { left: Shape, right: Shape },

    #[error("Unsupported operation: {reason}")]
    UnsupportedOperation { reason: String },

    #[error("Lifecycle error: {reason}")]
    Lifecycle { reason: String },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl ArrayError {
    pub(crate) fn construction(reason: impl Into<String>) -> Self {
        ArrayError::Construction { reason: reason.into() }
    }

    pub(crate) fn index(reason: impl Into<String>) -> Self {
        ArrayError::Index { reason: reason.into() }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        ArrayError::UnsupportedOperation { reason: reason.into() }
    }

    pub(crate) fn lifecycle(reason: impl Into<String>) -> Self {
        ArrayError::Lifecycle { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ArrayError>;
