//! Cancellable best-placement search.
//!
//! Templates with a single usable level are scored at every placement of
//! the full-resolution image. Templates with coarse levels are searched
//! coarse-to-fine: the coarsest image level is scanned in full, the strongest
//! separated peaks are kept, and each is re-scored in a small window at every
//! finer level. Full scans run in bands of placement rows and sample the
//! cancel token between bands.

use crate::image::ImagePyramid;
use crate::kernel::{Peak, Placements};
use crate::run::CancelToken;
use crate::template::{TemplatePlan, MAX_PYRAMID_LEVELS};
use crate::trace::trace_debug;
use crate::util::TaskSweepResult;
use crate::ImageView;

pub(crate) mod coarse;
pub(crate) mod refine;

/// Placement rows scored between two cancellation checks.
pub const DEFAULT_BAND_ROWS: usize = 16;

/// Coarse-to-fine search parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Placement rows per band of a full scan.
    pub band_rows: usize,
    /// Pyramid depth including full resolution; 1 forces full scans.
    pub max_levels: usize,
    /// Coarse peaks carried down to the finer levels.
    pub beam_width: usize,
    /// Re-scoring radius, in placements, around an upsampled peak.
    pub refine_radius: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            band_rows: DEFAULT_BAND_ROWS,
            max_levels: MAX_PYRAMID_LEVELS,
            beam_width: 32,
            refine_radius: 2,
        }
    }
}

/// Best placement of the template described by `plans` in `image`.
///
/// `plans` holds one plan per template pyramid level, full resolution first.
/// Returns `Err(Cancelled)` when `cancel` is raised mid-search.
pub(crate) fn best_peak(
    image: ImageView<'_, u8>,
    plans: &[TemplatePlan],
    cfg: &SearchConfig,
    cancel: &CancelToken,
) -> TaskSweepResult<Option<Peak>> {
    let Some(full) = plans.first() else {
        return Ok(None);
    };
    let depth = plans.len().min(cfg.max_levels.max(1));
    if depth <= 1 {
        return coarse::banded_best(image, full, cfg.band_rows, cancel);
    }

    let pyramid = ImagePyramid::build(image, depth)?;
    let top = (1..pyramid.len()).rev().find(|&level| {
        match (pyramid.level(level), plans.get(level)) {
            (Some(img), Some(plan)) => Placements::full(img, plan).is_some(),
            _ => false,
        }
    });
    let Some(top) = top else {
        return coarse::banded_best(image, full, cfg.band_rows, cancel);
    };

    let (Some(coarse_img), Some(coarse_plan)) = (pyramid.level(top), plans.get(top)) else {
        return Ok(None);
    };
    let mut candidates = coarse::candidates(coarse_img, coarse_plan, cfg, cancel)?;
    trace_debug!("coarse candidates", level = top, count = candidates.len());

    for level in (0..top).rev() {
        cancel.check()?;
        let (Some(img), Some(plan)) = (pyramid.level(level), plans.get(level)) else {
            return Ok(None);
        };
        candidates = refine::to_finer_level(img, plan, &candidates, cfg.refine_radius);
    }
    Ok(candidates
        .into_iter()
        .reduce(|best, peak| if peak.beats(&best) { peak } else { best }))
}
