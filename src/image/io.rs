//! Conversions between the `image` crate and tasksweep buffers.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::OwnedImage;
use crate::util::{TaskSweepError, TaskSweepResult};
use std::path::Path;

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> TaskSweepResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Converts any decoded image to grayscale.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> TaskSweepResult<OwnedImage> {
    owned_from_gray_image(&img.to_luma8())
}

/// Loads an image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> TaskSweepResult<OwnedImage> {
    let img = image::open(path).map_err(|err| TaskSweepError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
