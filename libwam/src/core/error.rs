//! error types for the wam codec

use thiserror::Error;

/// everything that can go wrong in libwam
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WamError {
    /// malformed or unsupported stream (bad magic, type, version, sizes)
    #[error("format error: {0}")]
    Format(String),

    /// invalid construction parameter or call argument
    #[error("parameter error: {0}")]
    Parameter(String),
}

impl WamError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        WamError::Format(msg.into())
    }

    pub(crate) fn parameter(msg: impl Into<String>) -> Self {
        WamError::Parameter(msg.into())
    }
}

/// result type used throughout libwam
pub type WamResult<T> = Result<T, WamError>;
