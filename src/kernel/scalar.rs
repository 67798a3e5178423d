//! Scalar reference kernel.

use crate::kernel::{valid_window, zncc_at, Kernel, Peak, Placements};
use crate::template::TemplatePlan;
use crate::ImageView;

/// Scalar unmasked ZNCC kernel, scanning placements in raster order.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        if image.width() < plan.width() || image.height() < plan.height() {
            return f32::NEG_INFINITY;
        }
        if x > image.width() - plan.width() || y > image.height() - plan.height() {
            return f32::NEG_INFINITY;
        }
        zncc_at(image, plan, x, y)
    }

    fn best_in(image: ImageView<'_, u8>, plan: &TemplatePlan, window: Placements) -> Option<Peak> {
        let window = valid_window(image, plan, window)?;
        let mut best: Option<Peak> = None;
        for y in window.y0..=window.y1 {
            for x in window.x0..=window.x1 {
                let score = zncc_at(image, plan, x, y);
                if score == f32::NEG_INFINITY {
                    continue;
                }
                let peak = Peak { x, y, score };
                if best.map_or(true, |b| peak.beats(&b)) {
                    best = Some(peak);
                }
            }
        }
        best
    }

    fn surface(image: ImageView<'_, u8>, plan: &TemplatePlan, window: Placements) -> Vec<f32> {
        let Some(window) = valid_window(image, plan, window) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(window.width() * window.height());
        for y in window.y0..=window.y1 {
            for x in window.x0..=window.x1 {
                out.push(zncc_at(image, plan, x, y));
            }
        }
        out
    }
}
