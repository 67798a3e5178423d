//! Re-scoring coarse peaks at the next finer level.

use crate::kernel::{DefaultKernel, Kernel, Peak, Placements};
use crate::template::TemplatePlan;
use crate::ImageView;

/// Best placement near each upsampled peak of the coarser level.
///
/// A coarse placement `(x, y)` maps to `(2x, 2y)`; the window spans
/// `radius` placements around it. Peaks whose window falls outside the
/// image are dropped.
pub(crate) fn to_finer_level(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    coarse: &[Peak],
    radius: usize,
) -> Vec<Peak> {
    let Some(full) = Placements::full(image, plan) else {
        return Vec::new();
    };
    coarse
        .iter()
        .filter_map(|peak| {
            let window = full.around(peak.x.saturating_mul(2), peak.y.saturating_mul(2), radius)?;
            DefaultKernel::best_in(image, plan, window)
        })
        .collect()
}
