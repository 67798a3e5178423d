//! Single best-match lookup of a template inside a frame.

use crate::geometry::Point;
use crate::run::CancelToken;
use crate::search::{best_peak, SearchConfig};
use crate::template::Template;
use crate::trace::{trace_debug, trace_event, trace_warn};
use crate::util::{TaskSweepError, TaskSweepResult};
use crate::ImageView;

/// Default acceptance threshold on the correlation score.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.8;

/// Matching policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    /// A peak is accepted only when its score is strictly greater.
    pub threshold: f32,
    pub search: SearchConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            search: SearchConfig::default(),
        }
    }
}

/// An accepted match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Center of the matched marker (top-left + half the template size).
    pub center: Point,
    /// Correlation score in `[-1, 1]`.
    pub score: f32,
}

/// Wraps one correlation call and applies the acceptance threshold.
///
/// Matching is a pure function of its inputs. Empty inputs and templates
/// larger than the image are reported as "no match", never as errors; the
/// only error is cancellation, from [`FrameMatcher::find_cancellable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameMatcher {
    cfg: MatchConfig,
}

impl FrameMatcher {
    pub fn new(cfg: MatchConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Finds the best placement of `template` in `image`.
    pub fn find(&self, image: Option<ImageView<'_, u8>>, template: &Template) -> Option<Match> {
        self.find_cancellable(image, template, &CancelToken::new())
            .ok()
            .flatten()
    }

    /// Like [`FrameMatcher::find`], but gives up with
    /// [`TaskSweepError::Cancelled`] soon after `cancel` is raised.
    pub fn find_cancellable(
        &self,
        image: Option<ImageView<'_, u8>>,
        template: &Template,
        cancel: &CancelToken,
    ) -> TaskSweepResult<Option<Match>> {
        let (Some(image), Some(plan)) = (image, template.plan()) else {
            trace_debug!("match skipped: empty frame or template", template = template.name());
            return Ok(None);
        };
        if plan.width() > image.width() || plan.height() > image.height() {
            trace_event!(
                "match skipped: template larger than image",
                template = template.name(),
                tpl_width = plan.width(),
                tpl_height = plan.height(),
                img_width = image.width(),
                img_height = image.height()
            );
            return Ok(None);
        }
        let (tpl_width, tpl_height) = (plan.width(), plan.height());

        let peak = match best_peak(image, template.plans(), &self.cfg.search, cancel) {
            Ok(Some(peak)) => peak,
            Ok(None) => return Ok(None),
            Err(TaskSweepError::Cancelled) => return Err(TaskSweepError::Cancelled),
            Err(err) => {
                let error = err.to_string();
                trace_warn!("match failed", template = template.name(), error = error.as_str());
                return Ok(None);
            }
        };
        if peak.score <= self.cfg.threshold {
            return Ok(None);
        }
        let center = Point::new(
            (peak.x + tpl_width / 2) as i32,
            (peak.y + tpl_height / 2) as i32,
        );
        Ok(Some(Match {
            center,
            score: peak.score,
        }))
    }
}
