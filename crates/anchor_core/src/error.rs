//! Anchor error types

use thiserror::Error;

/// Errors raised while parsing anchor configuration
///
/// Runtime anchor behavior never fails; only configuration input does.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnchorError {
    /// A bound was neither a pixel number nor a percentage
    #[error("invalid activation bound '{0}'")]
    InvalidBound(String),

    /// An activation window needs one or two bounds
    #[error("activation window expects 1 or 2 bounds, got {0}")]
    InvalidWindow(usize),
}

/// Result type for anchor configuration parsing
pub type Result<T> = std::result::Result<T, AnchorError>;
