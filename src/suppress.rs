//! Region suppression: excluding an already matched marker from later
//! match attempts on the same frame.
//!
//! The exclusion mask records which pixels are out of play; applying it to
//! a working copy zeroes them, which leaves every window over the region
//! flat and therefore unmatchable. Rectangles may hang past the frame edge
//! and are clipped.

use crate::geometry::{ClippedRect, Point, Rect};
use crate::image::{ImageView, OwnedImage};
use crate::util::TaskSweepResult;

/// Default padding, in pixels, added on each side of a matched marker.
pub const DEFAULT_SUPPRESSION_PAD: i32 = 5;

/// Rectangle suppressed around a match centered on `center`.
///
/// Covers `(tpl_width + 2 * pad) x (tpl_height + 2 * pad)` pixels and is not
/// clipped; the frame may not contain all of it.
pub fn suppression_rect(center: Point, tpl_width: usize, tpl_height: usize, pad: i32) -> Rect {
    Rect::centered(center, tpl_width as i32, tpl_height as i32).padded(pad)
}

/// Pixels excluded from future matches within one scan.
#[derive(Clone, Debug)]
pub struct ExclusionMask {
    width: usize,
    height: usize,
    excluded: Vec<bool>,
}

impl ExclusionMask {
    /// Mask with nothing excluded.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            excluded: vec![false; width * height],
        }
    }

    /// Marks the part of `rect` inside the mask as excluded.
    ///
    /// Returns the number of pixels that were not excluded before.
    pub fn exclude(&mut self, rect: Rect) -> usize {
        let Some(clip) = rect.clip(self.width, self.height) else {
            return 0;
        };
        let mut added = 0;
        for y in clip.y..clip.y + clip.height {
            let row = &mut self.excluded[y * self.width + clip.x..y * self.width + clip.x + clip.width];
            for cell in row.iter_mut().filter(|c| !**c) {
                *cell = true;
                added += 1;
            }
        }
        added
    }

    /// Excludes `rect` and zeroes the same pixels of `image` in one step.
    pub fn exclude_in(&mut self, rect: Rect, image: &mut OwnedImage) -> usize {
        let added = self.exclude(rect);
        if let Some(clip) = rect.clip(image.width(), image.height()) {
            image.fill_rect(clip, 0);
        }
        added
    }

    pub fn is_excluded(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.excluded[y * self.width + x]
    }

    /// Number of excluded pixels.
    pub fn count(&self) -> usize {
        self.excluded.iter().filter(|c| **c).count()
    }

    /// Zeroes every excluded pixel of `image` (inverted-mask AND).
    ///
    /// The mask and the image must have the same size; extra pixels on
    /// either side are ignored.
    pub fn apply(&self, image: &mut OwnedImage) {
        let width = self.width.min(image.width());
        let height = self.height.min(image.height());
        for y in 0..height {
            let mut x = 0;
            while x < width {
                if !self.excluded[y * self.width + x] {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < width && self.excluded[y * self.width + x] {
                    x += 1;
                }
                image.fill_rect(
                    ClippedRect {
                        x: start,
                        y,
                        width: x - start,
                        height: 1,
                    },
                    0,
                );
            }
        }
    }
}

/// Returns a copy of `frame` with the neighbourhood of one match erased.
pub fn suppress_region(
    frame: ImageView<'_, u8>,
    center: Point,
    tpl_width: usize,
    tpl_height: usize,
    pad: i32,
) -> TaskSweepResult<OwnedImage> {
    let mut out = OwnedImage::from_view(frame)?;
    let mut mask = ExclusionMask::new(out.width(), out.height());
    mask.exclude(suppression_rect(center, tpl_width, tpl_height, pad));
    mask.apply(&mut out);
    Ok(out)
}
