//! Error types for tasksweep.

use thiserror::Error;

/// Result alias for tasksweep operations.
pub type TaskSweepResult<T> = std::result::Result<T, TaskSweepError>;

/// Errors that can occur while building images, templates or driving the
/// target application.
///
/// Recoverable conditions (empty template, empty frame, a single failed
/// match) are never reported through this type; they surface as empty
/// results instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskSweepError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is too small for the requested layout.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the image.
    #[error("roi {width}x{height}@({x},{y}) outside {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template has no usable contrast.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// Template is smaller than the minimum supported side length.
    #[error("template {width}x{height} smaller than {min}px")]
    TemplateTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },
    /// Image decoding or file access failed.
    #[error("image i/o: {reason}")]
    ImageIo { reason: String },
    /// A synthetic input action could not be delivered.
    #[error("input action failed: {reason}")]
    Input { reason: String },
    /// The run was cancelled while an operation was in flight.
    #[error("cancelled")]
    Cancelled,
}
