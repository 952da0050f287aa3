//! Renderer error types.

/// Error raised while dispatching events.
///
/// Only popping an output sink can fail. A failure means the event producer
/// delivered an end event with no matching begin, and the output is no longer
/// usable.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RenderError {
    /// Attempted to pop the permanent base sink.
    #[error("output sink stack underflow: no {0} sink to close")]
    StackUnderflow(&'static str),
}

/// Result alias for renderer operations.
pub type Result<T> = std::result::Result<T, RenderError>;
