//! Scroll-and-rescan traversal of lists longer than one screen.
//!
//! Each capture is scanned exhaustively; items seen in more than one
//! capture are merged by a [`DedupPolicy`], and the result is returned in
//! reading order (top-to-bottom, then left-to-right) regardless of the order
//! captures were taken in.
//!
//! Two strategies exist. [`PaginatedCollector::scroll_search`] keeps
//! scrolling until something shows up or a cap is hit; it is used for the
//! task list, which may render slowly. [`PaginatedCollector::two_phase`]
//! always takes exactly two samples (capture, scroll down, capture, scroll
//! back) and is used for the short video list inside a task.

use crate::config::{ScrollSearchConfig, TwoPhaseConfig};
use crate::dedup::{CourseDedupIndex, DedupPolicy};
use crate::desktop::{Desktop, FrameSource, InputActuator, Pacer};
use crate::frame::Frame;
use crate::geometry::Point;
use crate::run::RunContext;
use crate::scanner::IconScanner;
use crate::template::Template;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::TaskSweepResult;

/// One item of a collected list with its rank in reading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkItem {
    /// Zero-based rank after sorting by `(y, x)`.
    pub ordinal: usize,
    pub position: Point,
}

/// Sorts points in reading order and numbers them.
pub fn rank(mut points: Vec<Point>) -> Vec<WorkItem> {
    points.sort_by(Point::reading_order);
    points
        .into_iter()
        .enumerate()
        .map(|(ordinal, position)| WorkItem { ordinal, position })
        .collect()
}

/// Keeps the first occurrence of every item under `policy`, then ranks.
pub fn merge<D: DedupPolicy>(points: impl IntoIterator<Item = Point>, mut policy: D) -> Vec<WorkItem> {
    rank(points.into_iter().filter(|p| policy.is_new(*p)).collect())
}

/// State of one list traversal; discarded when the traversal ends.
#[derive(Debug)]
pub struct ScanSession<D> {
    dedup: D,
    items: Vec<Point>,
    captures: usize,
}

impl<D: DedupPolicy> ScanSession<D> {
    pub fn new(dedup: D) -> Self {
        Self {
            dedup,
            items: Vec::new(),
            captures: 0,
        }
    }

    /// Marks `point` as seen; `false` means it duplicates an earlier item.
    pub fn observe(&mut self, point: Point) -> bool {
        self.dedup.is_new(point)
    }

    /// Retains an observed item.
    pub fn retain(&mut self, point: Point) {
        self.items.push(point);
    }

    /// Observes and, when new, retains `point`.
    pub fn offer(&mut self, point: Point) -> bool {
        let fresh = self.observe(point);
        if fresh {
            self.retain(point);
        }
        fresh
    }

    pub fn count_capture(&mut self) {
        self.captures += 1;
    }

    pub fn captures(&self) -> usize {
        self.captures
    }

    /// Retained items in capture order.
    pub fn items(&self) -> &[Point] {
        &self.items
    }

    /// Ends the traversal and ranks the retained items.
    pub fn finish(self) -> Vec<WorkItem> {
        rank(self.items)
    }
}

/// How a scroll search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// Still looking; carries the scrolls issued so far.
    Searching { scroll_attempts: usize },
    /// At least one item was found.
    Found,
    /// Caps reached with nothing found, capture failed, or cancelled.
    Exhausted,
}

/// Result of a scroll search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub items: Vec<WorkItem>,
    pub state: SearchState,
    pub scroll_attempts: usize,
    pub captures: usize,
}

impl Collection {
    fn exhausted() -> Self {
        Self {
            items: Vec::new(),
            state: SearchState::Exhausted,
            scroll_attempts: 0,
            captures: 0,
        }
    }
}

/// Drives captures and scrolls over a scrollable list.
#[derive(Clone, Copy, Debug)]
pub struct PaginatedCollector {
    scanner: IconScanner,
    anchor: Point,
    search: ScrollSearchConfig,
    two_phase: TwoPhaseConfig,
}

impl PaginatedCollector {
    /// `anchor` is where the pointer must rest for the list to scroll.
    pub fn new(
        scanner: IconScanner,
        anchor: Point,
        search: ScrollSearchConfig,
        two_phase: TwoPhaseConfig,
    ) -> Self {
        Self {
            scanner,
            anchor,
            search,
            two_phase,
        }
    }

    pub fn scanner(&self) -> &IconScanner {
        &self.scanner
    }

    /// Scrolls down until a capture shows at least one `template`.
    ///
    /// Stops when a capture yields items, when more than `soft_cap` scrolls
    /// found nothing, when `hard_cap` scrolls were issued, when a capture
    /// fails, or on cancellation. Never fails on "nothing found"; only input
    /// errors propagate.
    pub fn scroll_search<S, A, P, D>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        template: &Template,
        dedup: D,
        ctx: &RunContext,
    ) -> TaskSweepResult<Collection>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
        D: DedupPolicy,
    {
        let _span = trace_span!("collect", template = template.name()).entered();
        if template.is_empty() {
            trace_event!("template invalid, skipping search", template = template.name());
            return Ok(Collection::exhausted());
        }

        let mut session = ScanSession::new(dedup);
        let mut state = SearchState::Searching { scroll_attempts: 0 };
        let mut scroll_attempts = 0;
        while let SearchState::Searching { .. } = state {
            if ctx.is_cancelled() || scroll_attempts >= self.search.hard_cap {
                state = SearchState::Exhausted;
                break;
            }

            let frame = desktop.capture();
            if frame.is_empty() {
                trace_event!("capture failed, ending search", template = template.name());
                state = SearchState::Exhausted;
                break;
            }
            session.count_capture();

            let found = self.scanner.find_all(&frame, template, ctx.cancel_token());
            let fresh = found.iter().filter(|p| session.offer(**p)).count();
            trace_debug!(
                "capture scanned",
                template = template.name(),
                found = found.len(),
                fresh = fresh
            );
            if !found.is_empty() {
                state = SearchState::Found;
                break;
            }
            if scroll_attempts > self.search.soft_cap || ctx.is_cancelled() {
                state = SearchState::Exhausted;
                break;
            }

            desktop.input.move_to(self.anchor)?;
            desktop.input.scroll(self.search.scroll_steps)?;
            scroll_attempts += 1;
            trace_event!(
                "scrolled list",
                template = template.name(),
                scroll_attempts = scroll_attempts
            );
            desktop.wait(self.search.settle);
            state = SearchState::Searching { scroll_attempts };
        }

        let captures = session.captures();
        let items = session.finish();
        trace_event!("search finished", template = template.name(), found = items.len());
        Ok(Collection {
            items,
            state,
            scroll_attempts,
            captures,
        })
    }

    /// Captures, scrolls down, captures again and scrolls back.
    ///
    /// Items are merged across both captures with a [`CourseDedupIndex`]
    /// consulted as each match is accepted, so duplicates are dropped before
    /// `keep` runs. `keep` sees the unsuppressed capture and decides whether
    /// a new item is retained. Cancellation between steps yields
    /// [`TaskSweepError::Cancelled`](crate::TaskSweepError::Cancelled).
    pub fn two_phase<S, A, P, F>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        template: &Template,
        ctx: &RunContext,
        mut keep: F,
    ) -> TaskSweepResult<Vec<WorkItem>>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
        F: FnMut(&Frame, Point) -> bool,
    {
        let _span = trace_span!("collect", template = template.name(), two_phase = true).entered();
        let cfg = self.two_phase;
        let mut session = ScanSession::new(CourseDedupIndex::new(cfg.bucket_size));

        ctx.check()?;
        desktop.input.move_to(self.anchor)?;
        desktop.wait(cfg.anchor_settle);

        ctx.check()?;
        let initial = self.scan_view(desktop, template, ctx, &mut session, &mut keep);
        trace_event!("initial view scanned", kept = initial);

        ctx.check()?;
        desktop.input.scroll(-cfg.scroll_steps)?;
        desktop.wait(cfg.settle);

        ctx.check()?;
        let scrolled = self.scan_view(desktop, template, ctx, &mut session, &mut keep);
        trace_event!("scrolled view scanned", kept = scrolled);

        ctx.check()?;
        desktop.input.scroll(cfg.scroll_steps)?;
        desktop.wait(cfg.settle);

        let items = session.finish();
        trace_event!("two-phase scan finished", kept = items.len());
        Ok(items)
    }

    fn scan_view<S, A, P, D, F>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        template: &Template,
        ctx: &RunContext,
        session: &mut ScanSession<D>,
        keep: &mut F,
    ) -> usize
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
        D: DedupPolicy,
        F: FnMut(&Frame, Point) -> bool,
    {
        let frame = desktop.capture();
        if frame.is_empty() {
            trace_event!("capture failed, skipping view", template = template.name());
            return 0;
        }
        session.count_capture();

        let mut kept = 0;
        for hit in self.scanner.matches(&frame, template, ctx.cancel_token()) {
            let point = hit.center;
            if !session.observe(point) {
                trace_debug!("item already seen, skipping", x = point.x, y = point.y);
                continue;
            }
            if keep(&frame, point) {
                session.retain(point);
                kept += 1;
            }
        }
        kept
    }
}
