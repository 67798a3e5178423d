//! Grayscale image views and owned buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride
//! (elements between row starts). Regions of interest are zero-copy views
//! into the same backing slice and keep the parent stride, so the completion
//! check can correlate inside a sub-rectangle of a captured frame without
//! copying it.

use crate::geometry::ClippedRect;
use crate::util::{TaskSweepError, TaskSweepResult};

#[cfg(feature = "image-io")]
pub mod io;
mod owned;
mod pyramid;

pub use owned::OwnedImage;
pub use pyramid::{downsample, ImagePyramid};

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> TaskSweepResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> TaskSweepResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(TaskSweepError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view; the region must lie fully inside.
    pub fn roi(&self, rect: ClippedRect) -> TaskSweepResult<ImageView<'a, T>> {
        let ClippedRect {
            x,
            y,
            width,
            height,
        } = rect;
        if width == 0 || height == 0 {
            return Err(TaskSweepError::InvalidDimensions { width, height });
        }
        let out_of_bounds = TaskSweepError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(TaskSweepError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(TaskSweepError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> TaskSweepResult<usize> {
    if width == 0 || height == 0 {
        return Err(TaskSweepError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(TaskSweepError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(TaskSweepError::InvalidDimensions { width, height })
}
