//! Marker templates and their precomputed plans.

use crate::geometry::ClippedRect;
use crate::image::{downsample, ImageView, OwnedImage};
use crate::kernel::scalar::ZnccScalar;
use crate::kernel::Kernel;
use crate::util::{TaskSweepError, TaskSweepResult};
use std::sync::Arc;

mod plan;
pub mod store;

pub use plan::TemplatePlan;
pub use store::{Marker, TemplateStore};

/// Default minimum side length for a usable template.
pub const MIN_TEMPLATE_SIDE: usize = 10;

/// Coarse levels are built only while both template sides stay this long.
pub const MIN_COARSE_SIDE: usize = 12;

/// Deepest template pyramid, full resolution included.
pub const MAX_PYRAMID_LEVELS: usize = 3;

/// Minimum ZNCC between a coarse level and the same level built one pixel
/// off the grid. Below it, an instance at an odd offset would not stand out
/// at that level and the pyramid stops.
pub const MIN_PHASE_AGREEMENT: f32 = 0.8;

struct Loaded {
    img: OwnedImage,
    plans: Vec<TemplatePlan>,
}

/// Immutable grayscale marker image with a name.
///
/// An invalid template is the distinguished empty value rather than an
/// error: it never matches anything, and every consumer checks
/// [`Template::is_empty`] before scanning with it. Cloning is cheap.
#[derive(Clone)]
pub struct Template {
    name: Arc<str>,
    loaded: Option<Arc<Loaded>>,
}

impl Template {
    /// Builds a template, rejecting images with a side below `min_side` or
    /// without contrast.
    pub fn new(name: impl Into<Arc<str>>, img: OwnedImage, min_side: usize) -> TaskSweepResult<Self> {
        if img.width() < min_side || img.height() < min_side {
            return Err(TaskSweepError::TemplateTooSmall {
                width: img.width(),
                height: img.height(),
                min: min_side,
            });
        }
        let plans = level_plans(&img)?;
        Ok(Self {
            name: name.into(),
            loaded: Some(Arc::new(Loaded { img, plans })),
        })
    }

    /// Builds a template from a raw row-major buffer.
    pub fn from_raw(
        name: impl Into<Arc<str>>,
        data: Vec<u8>,
        width: usize,
        height: usize,
    ) -> TaskSweepResult<Self> {
        Self::new(name, OwnedImage::new(data, width, height)?, MIN_TEMPLATE_SIDE)
    }

    /// The empty template, which never matches.
    pub fn empty(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            loaded: None,
        }
    }

    /// Identity of the template, usually the file it came from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_none()
    }

    /// Template size as `(width, height)`; `(0, 0)` when empty.
    pub fn size(&self) -> (usize, usize) {
        self.loaded
            .as_ref()
            .map_or((0, 0), |l| (l.img.width(), l.img.height()))
    }

    /// Borrowed pixels, or `None` when empty.
    pub fn view(&self) -> Option<ImageView<'_, u8>> {
        self.loaded.as_ref().map(|l| l.img.view())
    }

    /// Pyramid depth usable for coarse-to-fine search; 0 when empty.
    pub fn levels(&self) -> usize {
        self.plans().len()
    }

    pub(crate) fn plan(&self) -> Option<&TemplatePlan> {
        self.plans().first()
    }

    /// Plans per pyramid level, full resolution first.
    pub(crate) fn plans(&self) -> &[TemplatePlan] {
        match &self.loaded {
            Some(loaded) => &loaded.plans,
            None => &[],
        }
    }
}

fn level_plans(img: &OwnedImage) -> TaskSweepResult<Vec<TemplatePlan>> {
    let mut plans = vec![TemplatePlan::from_view(img.view())?];
    let mut current: Option<OwnedImage> = None;
    while plans.len() < MAX_PYRAMID_LEVELS {
        let src = current.as_ref().map_or(img.view(), OwnedImage::view);
        let Some(next) = downsample(src)? else {
            break;
        };
        if next.width() < MIN_COARSE_SIDE || next.height() < MIN_COARSE_SIDE {
            break;
        }
        if !phase_stable(src, &next)? {
            break;
        }
        let Ok(plan) = TemplatePlan::from_view(next.view()) else {
            break;
        };
        plans.push(plan);
        current = Some(next);
    }
    Ok(plans)
}

/// Whether `aligned`, the halving of `src`, still correlates with the
/// halving of `src` shifted by one pixel in both directions.
fn phase_stable(src: ImageView<'_, u8>, aligned: &OwnedImage) -> TaskSweepResult<bool> {
    let shifted_src = src.roi(ClippedRect {
        x: 1,
        y: 1,
        width: src.width() - 1,
        height: src.height() - 1,
    })?;
    let Some(shifted) = downsample(shifted_src)? else {
        return Ok(false);
    };
    let common = ClippedRect {
        x: 0,
        y: 0,
        width: shifted.width().min(aligned.width()),
        height: shifted.height().min(aligned.height()),
    };
    let Ok(plan) = TemplatePlan::from_view(aligned.view().roi(common)?) else {
        return Ok(false);
    };
    let agreement = ZnccScalar::score_at(shifted.view().roi(common)?, &plan, 0, 0);
    Ok(agreement >= MIN_PHASE_AGREEMENT)
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.size();
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}
