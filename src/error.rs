//! Error types for the noverlap core.

use thiserror::Error;

/// Errors produced while validating input to the layout iteration.
///
/// The iteration itself is a pure numeric transform and has no failure
/// paths once its inputs are accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoverlapError {
    /// The node buffer length is not a multiple of the per-node stride.
    #[error("node buffer length {len} is not a multiple of the stride {stride}")]
    BadStride { len: usize, stride: usize },

    /// A layout setting is out of its accepted range.
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        name: &'static str,
        reason: &'static str,
    },
}
