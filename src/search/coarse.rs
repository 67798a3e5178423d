//! Full scans: the banded best placement and coarse candidate extraction.

use crate::kernel::{DefaultKernel, Kernel, Peak, Placements};
use crate::run::CancelToken;
use crate::search::SearchConfig;
use crate::template::TemplatePlan;
use crate::util::TaskSweepResult;
use crate::ImageView;

/// Exact global maximum, scanned band by band.
///
/// Bands are visited top to bottom and merged with the raster tie-break, so
/// the result equals a single full scan.
pub(crate) fn banded_best(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    band_rows: usize,
    cancel: &CancelToken,
) -> TaskSweepResult<Option<Peak>> {
    let Some(full) = Placements::full(image, plan) else {
        return Ok(None);
    };
    let mut best: Option<Peak> = None;
    for band in full.bands(band_rows) {
        cancel.check()?;
        if let Some(peak) = DefaultKernel::best_in(image, plan, band) {
            if best.map_or(true, |b| peak.beats(&b)) {
                best = Some(peak);
            }
        }
    }
    Ok(best)
}

/// Strongest separated local maxima of the full surface, best first.
///
/// At most `beam_width` peaks are returned, no two closer than half the
/// shorter template side in Chebyshev distance.
pub(crate) fn candidates(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    cfg: &SearchConfig,
    cancel: &CancelToken,
) -> TaskSweepResult<Vec<Peak>> {
    let Some(full) = Placements::full(image, plan) else {
        return Ok(Vec::new());
    };
    let (width, height) = (full.width(), full.height());
    let mut scores = Vec::with_capacity(width * height);
    for band in full.bands(cfg.band_rows) {
        cancel.check()?;
        scores.extend(DefaultKernel::surface(image, plan, band));
    }

    let mut peaks = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let score = scores[y * width + x];
            if score > f32::NEG_INFINITY && is_local_max(&scores, width, height, x, y) {
                peaks.push(Peak { x, y, score });
            }
        }
    }
    let radius = plan.width().min(plan.height()) / 2;
    Ok(nms(peaks, radius, cfg.beam_width))
}

fn is_local_max(scores: &[f32], width: usize, height: usize, x: usize, y: usize) -> bool {
    let score = scores[y * width + x];
    let rows = y.saturating_sub(1)..=(y + 1).min(height - 1);
    rows.into_iter().all(|ny| {
        (x.saturating_sub(1)..=(x + 1).min(width - 1)).all(|nx| scores[ny * width + nx] <= score)
    })
}

/// Greedy suppression in descending score order, raster order on ties.
fn nms(mut peaks: Vec<Peak>, radius: usize, limit: usize) -> Vec<Peak> {
    peaks.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| (a.y, a.x).cmp(&(b.y, b.x)))
    });
    let mut kept: Vec<Peak> = Vec::new();
    for peak in peaks {
        if kept.len() >= limit {
            break;
        }
        let clear = kept
            .iter()
            .all(|k| peak.x.abs_diff(k.x).max(peak.y.abs_diff(k.y)) > radius);
        if clear {
            kept.push(peak);
        }
    }
    kept
}
