//! Error type shared by every module of the core crate.

use thiserror::Error;

/// Errors raised by the sequencing, physics and stage logic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A caller passed a value outside the accepted domain (zero mass,
    /// out-of-range level, unknown track number, bad note name, ...).
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// A synth or sample has not finished loading. Callers recover locally
    /// by skipping the trigger.
    #[error("resource not ready: {resource}")]
    ResourceNotReady { resource: String },
}

impl CoreError {
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    pub fn not_ready(resource: impl Into<String>) -> Self {
        CoreError::ResourceNotReady {
            resource: resource.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
