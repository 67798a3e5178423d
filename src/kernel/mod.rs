//! Correlation kernels.
//!
//! A kernel evaluates the ZNCC surface of a template over a window of
//! top-left placements in an image and reports its maximum, or the whole
//! surface. The scalar kernel is always available; the row-parallel kernel
//! needs the `rayon` feature and returns the same values.

use crate::template::TemplatePlan;
use crate::ImageView;

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Best placement found on a correlation surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the placement's top-left corner.
    pub y: usize,
    /// ZNCC score at the placement, in `[-1, 1]`.
    pub score: f32,
}

impl Peak {
    /// True when `self` should replace `best`: higher score, or equal score
    /// earlier in raster order.
    pub(crate) fn beats(&self, best: &Peak) -> bool {
        self.score > best.score
            || (self.score == best.score && (self.y, self.x) < (best.y, best.x))
    }
}

/// Inclusive range of top-left placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placements {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Placements {
    /// Every placement of `plan` inside `image`; `None` if it does not fit.
    pub fn full(image: ImageView<'_, u8>, plan: &TemplatePlan) -> Option<Self> {
        if image.width() < plan.width() || image.height() < plan.height() {
            return None;
        }
        Some(Self {
            x0: 0,
            y0: 0,
            x1: image.width() - plan.width(),
            y1: image.height() - plan.height(),
        })
    }

    /// Placements within `radius` of `(x, y)`, clipped to `self`.
    pub fn around(&self, x: usize, y: usize, radius: usize) -> Option<Self> {
        self.intersect(&Self {
            x0: x.saturating_sub(radius),
            y0: y.saturating_sub(radius),
            x1: x.saturating_add(radius),
            y1: y.saturating_add(radius),
        })
    }

    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let out = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (out.x0 <= out.x1 && out.y0 <= out.y1).then_some(out)
    }

    pub fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0 + 1
    }

    /// Splits into horizontal bands of at most `rows` placement rows.
    pub fn bands(self, rows: usize) -> impl Iterator<Item = Placements> {
        let rows = rows.max(1);
        (self.y0..=self.y1).step_by(rows).map(move |y0| Placements {
            y0,
            y1: (y0 + rows - 1).min(self.y1),
            ..self
        })
    }
}

/// Windows whose per-pixel intensity variance is at or below this value
/// have no defined correlation and are skipped.
pub const MIN_WINDOW_VARIANCE: f64 = 1e-6;

/// Kernel trait for scoring and scanning.
pub trait Kernel {
    /// Score of a single placement, `f32::NEG_INFINITY` when undefined.
    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32;

    /// Maximum over the placements of `window`, clipped to valid ones.
    ///
    /// Returns `None` when nothing is left or every window is flat.
    fn best_in(image: ImageView<'_, u8>, plan: &TemplatePlan, window: Placements) -> Option<Peak>;

    /// Scores of every placement of `window` in row-major order, flat
    /// windows as `f32::NEG_INFINITY`. Empty when `window` has no valid
    /// placement.
    fn surface(image: ImageView<'_, u8>, plan: &TemplatePlan, window: Placements) -> Vec<f32>;

    /// Global maximum of the correlation surface.
    fn best(image: ImageView<'_, u8>, plan: &TemplatePlan) -> Option<Peak> {
        Self::best_in(image, plan, Placements::full(image, plan)?)
    }
}

/// `window` clipped to the placements where `plan` fits.
pub(crate) fn valid_window(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    window: Placements,
) -> Option<Placements> {
    Placements::full(image, plan)?.intersect(&window)
}

/// Kernel used by the matcher for the enabled feature set.
#[cfg(not(feature = "rayon"))]
pub type DefaultKernel = scalar::ZnccScalar;
/// Kernel used by the matcher for the enabled feature set.
#[cfg(feature = "rayon")]
pub type DefaultKernel = self::rayon::ZnccRowParallel;

/// ZNCC for the placement at `(x, y)`, shared by both kernels.
///
/// The caller guarantees the template fits at `(x, y)`.
#[inline]
pub(crate) fn zncc_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
    let tpl_width = plan.width();
    let tpl_height = plan.height();
    let t_prime = plan.t_prime();
    let n = (tpl_width * tpl_height) as f64;

    // f64 accumulation keeps flat windows exactly flat.
    let mut dot = 0.0f64;
    let mut sum_i = 0.0f64;
    let mut sum_i2 = 0.0f64;
    for ty in 0..tpl_height {
        let Some(img_row) = image.row(y + ty) else {
            return f32::NEG_INFINITY;
        };
        let window = &img_row[x..x + tpl_width];
        let base = ty * tpl_width;
        for (tx, &px) in window.iter().enumerate() {
            let value = f64::from(px);
            dot += f64::from(t_prime[base + tx]) * value;
            sum_i += value;
            sum_i2 += value * value;
        }
    }

    let var_i = sum_i2 - (sum_i * sum_i) / n;
    if var_i <= MIN_WINDOW_VARIANCE * n {
        return f32::NEG_INFINITY;
    }
    let score = (dot / (f64::from(plan.var_t()) * var_i).sqrt()) as f32;
    if score.is_finite() {
        score
    } else {
        f32::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::Placements;

    #[test]
    fn bands_cover_every_row_once() {
        let window = Placements {
            x0: 2,
            y0: 3,
            x1: 9,
            y1: 12,
        };
        let bands: Vec<_> = window.bands(4).map(|b| (b.y0, b.y1)).collect();
        assert_eq!(bands, vec![(3, 6), (7, 10), (11, 12)]);
        assert!(window.bands(4).all(|b| b.x0 == 2 && b.x1 == 9));
    }

    #[test]
    fn around_is_clipped() {
        let full = Placements {
            x0: 0,
            y0: 0,
            x1: 20,
            y1: 10,
        };
        let near_corner = full.around(1, 9, 2).unwrap();
        assert_eq!(
            near_corner,
            Placements {
                x0: 0,
                y0: 7,
                x1: 3,
                y1: 10
            }
        );
        assert_eq!((near_corner.width(), near_corner.height()), (4, 4));
        assert!(full.around(30, 30, 2).is_none());
    }
}
