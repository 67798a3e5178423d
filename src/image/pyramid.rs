//! Image pyramids for coarse-to-fine matching.
//!
//! Each level halves the previous one with a 2x2 box filter and integer
//! rounding: `dst = (a + b + c + d + 2) / 4`. An odd trailing row or column
//! is dropped.

use crate::image::{ImageView, OwnedImage};
use crate::util::{TaskSweepError, TaskSweepResult};

/// Halves `src` in both dimensions; `None` when a side is below 2.
pub fn downsample(src: ImageView<'_, u8>) -> TaskSweepResult<Option<OwnedImage>> {
    if src.width() < 2 || src.height() < 2 {
        return Ok(None);
    }
    let dst_width = src.width() / 2;
    let dst_height = src.height() / 2;
    let mut dst = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        let (Some(row0), Some(row1)) = (src.row(2 * y), src.row(2 * y + 1)) else {
            return Err(TaskSweepError::BufferTooSmall {
                needed: (2 * y + 2) * src.stride(),
                got: 0,
            });
        };
        for x in 0..dst_width {
            let sum = u16::from(row0[2 * x])
                + u16::from(row0[2 * x + 1])
                + u16::from(row1[2 * x])
                + u16::from(row1[2 * x + 1]);
            dst.push(((sum + 2) / 4) as u8);
        }
    }
    OwnedImage::new(dst, dst_width, dst_height).map(Some)
}

/// Borrowed base level plus owned coarser levels.
pub struct ImagePyramid<'a> {
    base: ImageView<'a, u8>,
    coarser: Vec<OwnedImage>,
}

impl<'a> ImagePyramid<'a> {
    /// Builds up to `max_levels` levels, base included.
    ///
    /// Stops early once a level can no longer be halved.
    pub fn build(base: ImageView<'a, u8>, max_levels: usize) -> TaskSweepResult<Self> {
        let mut coarser: Vec<OwnedImage> = Vec::new();
        while coarser.len() + 1 < max_levels {
            let src = coarser.last().map_or(base, OwnedImage::view);
            match downsample(src)? {
                Some(next) => coarser.push(next),
                None => break,
            }
        }
        Ok(Self { base, coarser })
    }

    /// Number of levels, at least 1.
    pub fn len(&self) -> usize {
        1 + self.coarser.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// View of level `index`; level 0 is the base resolution.
    pub fn level(&self, index: usize) -> Option<ImageView<'_, u8>> {
        match index {
            0 => Some(self.base),
            _ => self.coarser.get(index - 1).map(OwnedImage::view),
        }
    }
}
