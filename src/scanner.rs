//! Exhaustive enumeration of one marker inside one static frame.
//!
//! Enumeration is iterative non-maximum suppression by masking: take the
//! best match, erase its neighbourhood from a scan-local working copy, and
//! match again until nothing clears the threshold. This relies on every
//! instance of a marker being visually identical and spatially disjoint
//! from the others. A frame holding `k` instances costs at most `k + 1`
//! match attempts.

use crate::frame::Frame;
use crate::geometry::Point;
use crate::image::OwnedImage;
use crate::matcher::{FrameMatcher, Match};
use crate::run::CancelToken;
use crate::suppress::{suppression_rect, ExclusionMask, DEFAULT_SUPPRESSION_PAD};
use crate::template::Template;
use crate::trace::{trace_debug, trace_event, trace_span};

/// Enumerates every occurrence of a marker in a frame.
#[derive(Clone, Copy, Debug)]
pub struct IconScanner {
    matcher: FrameMatcher,
    pad: i32,
}

impl Default for IconScanner {
    fn default() -> Self {
        Self::new(FrameMatcher::default(), DEFAULT_SUPPRESSION_PAD)
    }
}

impl IconScanner {
    /// `pad` is the suppression padding added around each match.
    pub fn new(matcher: FrameMatcher, pad: i32) -> Self {
        Self { matcher, pad }
    }

    pub fn matcher(&self) -> &FrameMatcher {
        &self.matcher
    }

    /// Lazily enumerates matches, suppressing each one before yielding it.
    pub fn matches<'a>(
        &self,
        frame: &Frame,
        template: &'a Template,
        cancel: &'a CancelToken,
    ) -> Matches<'a> {
        let working = if template.is_empty() {
            trace_event!("template invalid, skipping scan", template = template.name());
            None
        } else if frame.is_empty() {
            trace_debug!("empty frame, skipping scan", template = template.name());
            None
        } else {
            frame.working_copy()
        };
        let (width, height) = frame.size();
        Matches {
            scanner: *self,
            template,
            cancel,
            mask: ExclusionMask::new(width, height),
            working,
            attempts: 0,
            finished: false,
        }
    }

    /// Centers of every occurrence of `template` in `frame`, in the order
    /// they were found (descending score).
    ///
    /// Empty templates or frames yield an empty result, never an error.
    pub fn find_all(&self, frame: &Frame, template: &Template, cancel: &CancelToken) -> Vec<Point> {
        let _span = trace_span!("scan", template = template.name()).entered();
        let points: Vec<Point> = self
            .matches(frame, template, cancel)
            .map(|m| m.center)
            .collect();
        trace_debug!("scan finished", template = template.name(), found = points.len());
        points
    }
}

/// Iterator over the matches of one scan.
///
/// Owns the scan's working copy of the frame; the copy never outlives the
/// iterator unless handed out through [`Matches::into_working_frame`].
pub struct Matches<'a> {
    scanner: IconScanner,
    template: &'a Template,
    cancel: &'a CancelToken,
    mask: ExclusionMask,
    working: Option<OwnedImage>,
    attempts: usize,
    finished: bool,
}

impl<'a> Matches<'a> {
    /// Match attempts made so far, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Ends the scan and returns the suppressed working copy.
    pub fn into_working_frame(self) -> Frame {
        self.working.map_or_else(Frame::empty, Frame::new)
    }
}

impl Iterator for Matches<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }
        let working = self.working.as_mut()?;
        self.attempts += 1;
        let found = self
            .scanner
            .matcher
            .find_cancellable(Some(working.view()), self.template, self.cancel);
        let Ok(Some(hit)) = found else {
            self.finished = true;
            return None;
        };
        // A hit completed after cancellation is dropped.
        if self.cancel.is_cancelled() {
            trace_debug!("scan cancelled", template = self.template.name());
            self.finished = true;
            return None;
        }

        let (tpl_width, tpl_height) = self.template.size();
        let rect = suppression_rect(hit.center, tpl_width, tpl_height, self.scanner.pad);
        if self.mask.exclude_in(rect, working) == 0 {
            // Nothing new was erased, so the next attempt would repeat this one.
            self.finished = true;
            return None;
        }
        trace_debug!(
            "marker found",
            template = self.template.name(),
            x = hit.center.x,
            y = hit.center.y,
            score = hit.score
        );
        Some(hit)
    }
}
