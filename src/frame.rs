//! Captured screen snapshots.

use crate::image::{ImageView, OwnedImage};

/// Immutable grayscale snapshot of the screen at one instant.
///
/// A failed capture is represented by [`Frame::empty`], never by an error;
/// consumers check [`Frame::is_empty`] and treat it as "retry later".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pixels: Option<OwnedImage>,
}

impl Frame {
    pub fn new(pixels: OwnedImage) -> Self {
        Self {
            pixels: Some(pixels),
        }
    }

    /// The distinguished empty frame.
    pub fn empty() -> Self {
        Self { pixels: None }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_none()
    }

    /// Borrowed pixels, or `None` for an empty frame.
    pub fn view(&self) -> Option<ImageView<'_, u8>> {
        self.pixels.as_ref().map(OwnedImage::view)
    }

    /// Frame size as `(width, height)`; `(0, 0)` when empty.
    pub fn size(&self) -> (usize, usize) {
        self.pixels
            .as_ref()
            .map_or((0, 0), |img| (img.width(), img.height()))
    }

    /// Scan-local copy that suppression may write into.
    pub(crate) fn working_copy(&self) -> Option<OwnedImage> {
        self.pixels.clone()
    }
}

impl From<OwnedImage> for Frame {
    fn from(pixels: OwnedImage) -> Self {
        Self::new(pixels)
    }
}
