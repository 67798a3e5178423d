//! Rayon row-parallel kernel (feature-gated).
//!
//! Rows of placements are scored in parallel and reduced to a single peak
//! with the same raster-order tie-breaking as the scalar kernel, so both
//! kernels return identical results. Only the correlation surface of one
//! window is parallelised; successive windows and match calls stay
//! sequential, so cancellation is still sampled between them.

use crate::kernel::scalar::ZnccScalar;
use crate::kernel::{valid_window, zncc_at, Kernel, Peak, Placements};
use crate::template::TemplatePlan;
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel unmasked ZNCC kernel.
pub struct ZnccRowParallel;

fn pick(a: Option<Peak>, b: Option<Peak>) -> Option<Peak> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.beats(&a) { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Kernel for ZnccRowParallel {
    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        ZnccScalar::score_at(image, plan, x, y)
    }

    fn best_in(image: ImageView<'_, u8>, plan: &TemplatePlan, window: Placements) -> Option<Peak> {
        let window = valid_window(image, plan, window)?;
        (window.y0..=window.y1)
            .into_par_iter()
            .map(|y| {
                let mut row_best: Option<Peak> = None;
                for x in window.x0..=window.x1 {
                    let score = zncc_at(image, plan, x, y);
                    if score == f32::NEG_INFINITY {
                        continue;
                    }
                    row_best = pick(row_best, Some(Peak { x, y, score }));
                }
                row_best
            })
            .reduce(|| None, pick)
    }

    fn surface(image: ImageView<'_, u8>, plan: &TemplatePlan, window: Placements) -> Vec<f32> {
        let Some(window) = valid_window(image, plan, window) else {
            return Vec::new();
        };
        let mut out = vec![f32::NEG_INFINITY; window.width() * window.height()];
        out.par_chunks_mut(window.width())
            .enumerate()
            .for_each(|(row, scores)| {
                let y = window.y0 + row;
                for (col, score) in scores.iter_mut().enumerate() {
                    *score = zncc_at(image, plan, window.x0 + col, y);
                }
            });
        out
    }
}
