//! Owned contiguous grayscale buffers.

use crate::geometry::ClippedRect;
use crate::image::ImageView;
use crate::util::{TaskSweepError, TaskSweepResult};

/// Owned contiguous grayscale image buffer (`stride == width`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> TaskSweepResult<Self> {
        if width == 0 || height == 0 {
            return Err(TaskSweepError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(TaskSweepError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(TaskSweepError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(TaskSweepError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image filled with a single value.
    pub fn filled(width: usize, height: usize, value: u8) -> TaskSweepResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(TaskSweepError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> TaskSweepResult<Self> {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = view.row(y).ok_or(TaskSweepError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: 0,
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Writes `value` into every pixel of `rect`.
    pub fn fill_rect(&mut self, rect: ClippedRect, value: u8) {
        let x_end = (rect.x + rect.width).min(self.width);
        let y_end = (rect.y + rect.height).min(self.height);
        if rect.x >= x_end {
            return;
        }
        for y in rect.y..y_end {
            let start = y * self.width;
            self.data[start + rect.x..start + x_end].fill(value);
        }
    }

    /// Copies `patch` so that its top-left corner lands on `(x0, y0)`.
    ///
    /// Pixels falling outside this image are dropped.
    pub fn blit(&mut self, patch: ImageView<'_, u8>, x0: usize, y0: usize) {
        for py in 0..patch.height() {
            let y = y0 + py;
            if y >= self.height {
                break;
            }
            let Some(row) = patch.row(py) else { break };
            for (px, &value) in row.iter().enumerate() {
                let x = x0 + px;
                if x >= self.width {
                    break;
                }
                self.data[y * self.width + x] = value;
            }
        }
    }
}
