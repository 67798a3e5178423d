//! Per-task workflow: select, enter, process videos, verify.
//!
//! A task moves through `Selecting -> Entered -> ProcessingVideos ->
//! Verifying` and ends `Completed` or `Failed`. Only input failures surface
//! as errors; everything the screen can throw at the agent (missing markers,
//! failed captures) ends in one of the outcomes below.

use crate::collector::{merge, PaginatedCollector, WorkItem};
use crate::config::{AgentConfig, CompletionRegion};
use crate::dedup::ExactDedup;
use crate::desktop::{Desktop, FrameSource, InputActuator, Pacer};
use crate::frame::Frame;
use crate::geometry::{ClippedRect, Point};
use crate::matcher::{FrameMatcher, Match};
use crate::run::RunContext;
use crate::scanner::IconScanner;
use crate::template::{Marker, Template, TemplateStore};
use crate::trace::{trace_debug, trace_event, trace_span, trace_warn};
use crate::util::{TaskSweepError, TaskSweepResult};

pub mod supervisor;

pub use supervisor::{Supervisor, SupervisorExit};

/// Markers whose presence denotes an actionable task-list entry.
pub const TASK_MARKERS: [Marker; 2] = [Marker::Task, Marker::TaskAlt];

/// Position of a task in its workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Selecting,
    Entered,
    ProcessingVideos,
    Verifying,
    Completed,
    Failed,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Selecting => "selecting",
            TaskState::Entered => "entered",
            TaskState::ProcessingVideos => "processing_videos",
            TaskState::Verifying => "verifying",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }
}

/// How one task attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Back on the task list; the cursor advances.
    Completed,
    /// Not verifiably back on the list; the same task is retried.
    Failed,
    /// Cancellation was observed mid-task.
    Cancelled,
}

/// How watching one video ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoOutcome {
    Completed,
    Cancelled,
    /// The configured poll timeout elapsed first.
    TimedOut,
}

/// Search region for the completion badge of a video row.
///
/// The region is centered on `anchor + offset`, sized to the badge plus the
/// margin but never below the minimum side, shifted right/down to start
/// inside the frame and trimmed at the right/bottom edges. Returns `None`
/// when nothing of it is left.
pub fn completion_roi(
    frame_size: (usize, usize),
    anchor: Point,
    badge_size: (usize, usize),
    area: &CompletionRegion,
) -> Option<ClippedRect> {
    let (frame_w, frame_h) = (frame_size.0 as i64, frame_size.1 as i64);
    let check = anchor.offset(area.offset_x, area.offset_y);
    let roi_w = (badge_size.0 + area.margin).max(area.min_side) as i64;
    let roi_h = (badge_size.1 + area.margin).max(area.min_side) as i64;

    let x = (i64::from(check.x) - roi_w / 2).max(0);
    let y = (i64::from(check.y) - roi_h / 2).max(0);
    let width = roi_w.min(frame_w - x);
    let height = roi_h.min(frame_h - y);
    if width <= 0 || height <= 0 {
        return None;
    }
    Some(ClippedRect {
        x: x as usize,
        y: y as usize,
        width: width as usize,
        height: height as usize,
    })
}

/// Drives one task through its workflow.
#[derive(Clone, Debug)]
pub struct TaskProcessor {
    cfg: AgentConfig,
    templates: TemplateStore,
    collector: PaginatedCollector,
}

impl TaskProcessor {
    pub fn new(cfg: AgentConfig, templates: TemplateStore) -> Self {
        let scanner = IconScanner::new(FrameMatcher::new(cfg.matching), cfg.suppression_pad);
        let collector = PaginatedCollector::new(
            scanner,
            cfg.layout.scroll_anchor,
            cfg.list_search,
            cfg.video_scan,
        );
        Self {
            cfg,
            templates,
            collector,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    fn matcher(&self) -> &FrameMatcher {
        self.collector.scanner().matcher()
    }

    fn template(&self, marker: Marker) -> &Template {
        self.templates.get(marker)
    }

    /// Builds the task list for a run.
    ///
    /// Runs one scroll search per task marker, concatenates the results,
    /// drops exact duplicates and sorts in reading order. An empty list means
    /// "no tasks available".
    pub fn collect_tasks<S, A, P>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        ctx: &RunContext,
    ) -> TaskSweepResult<Vec<WorkItem>>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        let mut found = Vec::new();
        for marker in TASK_MARKERS {
            let collection =
                self.collector
                    .scroll_search(desktop, self.template(marker), ExactDedup::new(), ctx)?;
            found.extend(collection.items.into_iter().map(|item| item.position));
        }
        let tasks = merge(found, ExactDedup::new());
        trace_event!("task list collected", tasks = tasks.len());
        Ok(tasks)
    }

    /// Runs one attempt at `task`.
    ///
    /// Cancellation yields [`TaskOutcome::Cancelled`] without clicking
    /// anything further. Input failures propagate.
    pub fn process_task<S, A, P>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        task: &WorkItem,
        ctx: &RunContext,
    ) -> TaskSweepResult<TaskOutcome>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        let _span = trace_span!(
            "task",
            ordinal = task.ordinal,
            x = task.position.x,
            y = task.position.y
        )
        .entered();
        match self.run_task(desktop, task, ctx) {
            Err(TaskSweepError::Cancelled) => {
                trace_event!("task cancelled", ordinal = task.ordinal);
                Ok(TaskOutcome::Cancelled)
            }
            other => other,
        }
    }

    fn run_task<S, A, P>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        task: &WorkItem,
        ctx: &RunContext,
    ) -> TaskSweepResult<TaskOutcome>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        let delays = self.cfg.delays;
        log_state(TaskState::Selecting);
        ctx.check()?;
        desktop.click_and_wait(task.position, delays.after_task_click)?;

        ctx.check()?;
        desktop.click_and_wait(self.cfg.layout.enter_task, delays.after_enter)?;
        log_state(TaskState::Entered);

        log_state(TaskState::ProcessingVideos);
        let videos = self.collect_incomplete_videos(desktop, ctx)?;
        trace_event!("incomplete videos collected", videos = videos.len());
        for video in &videos {
            match self.watch_video(desktop, video, ctx)? {
                VideoOutcome::Completed => {}
                VideoOutcome::Cancelled => return Err(TaskSweepError::Cancelled),
                VideoOutcome::TimedOut => {
                    trace_warn!("video timed out, task will be retried", ordinal = video.ordinal);
                    log_state(TaskState::Failed);
                    return Ok(TaskOutcome::Failed);
                }
            }
        }

        log_state(TaskState::Verifying);
        ctx.check()?;
        desktop.click_and_wait(self.cfg.layout.return_to_list, delays.after_return)?;
        if self.verify_return(desktop, ctx)? {
            log_state(TaskState::Completed);
            Ok(TaskOutcome::Completed)
        } else {
            trace_warn!("task list not visible after return", ordinal = task.ordinal);
            log_state(TaskState::Failed);
            Ok(TaskOutcome::Failed)
        }
    }

    /// Collects the videos of the open task that lack a completion badge.
    pub fn collect_incomplete_videos<S, A, P>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        ctx: &RunContext,
    ) -> TaskSweepResult<Vec<WorkItem>>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        self.collector.two_phase(
            desktop,
            self.template(Marker::VideoDuration),
            ctx,
            |frame, anchor| !self.is_video_completed(frame, anchor),
        )
    }

    /// Whether the completion badge shows next to the video row at `anchor`.
    ///
    /// Reads the unsuppressed capture. An empty badge template, an empty
    /// frame or a region falling off the frame all read as "not completed".
    pub fn is_video_completed(&self, frame: &Frame, anchor: Point) -> bool {
        let badge = self.template(Marker::VideoCompleted);
        if badge.is_empty() {
            trace_event!("completion badge template invalid", template = badge.name());
            return false;
        }
        let Some(view) = frame.view() else {
            return false;
        };
        let Some(rect) = completion_roi(frame.size(), anchor, badge.size(), &self.cfg.completion)
        else {
            trace_debug!("completion region outside frame", x = anchor.x, y = anchor.y);
            return false;
        };
        let completed = match view.roi(rect) {
            Ok(roi) => self.matcher().find(Some(roi), badge).is_some(),
            Err(_) => false,
        };
        trace_debug!(
            "completion checked",
            x = anchor.x,
            y = anchor.y,
            roi_width = rect.width,
            roi_height = rect.height,
            completed = completed
        );
        completed
    }

    /// Plays one video and polls until the study-complete banner shows.
    ///
    /// A pass-test prompt is clicked whenever it appears. Without a
    /// configured timeout this waits indefinitely.
    pub fn watch_video<S, A, P>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        video: &WorkItem,
        ctx: &RunContext,
    ) -> TaskSweepResult<VideoOutcome>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        let _span = trace_span!(
            "video",
            ordinal = video.ordinal,
            x = video.position.x,
            y = video.position.y
        )
        .entered();
        let delays = self.cfg.delays;
        if ctx.is_cancelled() {
            return Ok(VideoOutcome::Cancelled);
        }
        desktop.click_and_wait(video.position, delays.after_video_click)?;

        let started = desktop.pacer.now();
        loop {
            if ctx.is_cancelled() {
                return Ok(VideoOutcome::Cancelled);
            }
            if let Some(limit) = self.cfg.video_timeout {
                if desktop.pacer.now().saturating_sub(started) >= limit {
                    return Ok(VideoOutcome::TimedOut);
                }
            }

            let frame = desktop.capture();
            if frame.is_empty() {
                desktop.wait(delays.poll_interval);
                continue;
            }

            let pass_test = match self.find_marker(&frame, Marker::PassTest, ctx) {
                Err(TaskSweepError::Cancelled) => return Ok(VideoOutcome::Cancelled),
                other => other?,
            };
            if let Some(hit) = pass_test {
                trace_event!("pass-test prompt found", x = hit.center.x, y = hit.center.y);
                if ctx.is_cancelled() {
                    return Ok(VideoOutcome::Cancelled);
                }
                desktop.click_and_wait(hit.center, delays.after_pass_test)?;
            }

            let complete = match self.find_marker(&frame, Marker::StudyComplete, ctx) {
                Err(TaskSweepError::Cancelled) => return Ok(VideoOutcome::Cancelled),
                other => other?,
            };
            if complete.is_some() {
                trace_event!("video completed", ordinal = video.ordinal);
                desktop.wait(delays.after_study_complete);
                return Ok(VideoOutcome::Completed);
            }
            desktop.wait(delays.poll_interval);
        }
    }

    /// Whether the primary task-list marker is visible on a fresh capture.
    ///
    /// Fails with [`TaskSweepError::Cancelled`] when cancelled mid-scan.
    pub fn verify_return<S, A, P>(
        &self,
        desktop: &mut Desktop<S, A, P>,
        ctx: &RunContext,
    ) -> TaskSweepResult<bool>
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        let frame = desktop.capture();
        if frame.is_empty() {
            return Ok(false);
        }
        Ok(self.find_marker(&frame, Marker::Task, ctx)?.is_some())
    }

    fn find_marker(
        &self,
        frame: &Frame,
        marker: Marker,
        ctx: &RunContext,
    ) -> TaskSweepResult<Option<Match>> {
        self.matcher()
            .find_cancellable(frame.view(), self.template(marker), ctx.cancel_token())
    }
}

fn log_state(state: TaskState) {
    trace_debug!("task state", state = state.as_str());
}

#[cfg(test)]
mod tests {
    use super::completion_roi;
    use crate::config::CompletionRegion;
    use crate::geometry::{ClippedRect, Point};

    #[test]
    fn roi_is_centered_on_offset_point() {
        let area = CompletionRegion::default();
        let rect = completion_roi((1920, 1080), Point::new(400, 300), (20, 20), &area).unwrap();
        // Check point (944, 270), region 50x50.
        assert_eq!(
            rect,
            ClippedRect {
                x: 919,
                y: 245,
                width: 50,
                height: 50
            }
        );
    }

    #[test]
    fn roi_grows_with_large_badges() {
        let area = CompletionRegion::default();
        let rect = completion_roi((1920, 1080), Point::new(400, 300), (60, 40), &area).unwrap();
        assert_eq!((rect.width, rect.height), (80, 60));
    }

    #[test]
    fn roi_is_trimmed_at_right_and_bottom_edges() {
        let area = CompletionRegion::default();
        let rect = completion_roi((960, 300), Point::new(400, 320), (20, 20), &area).unwrap();
        assert_eq!((rect.x, rect.y), (919, 265));
        assert_eq!((rect.width, rect.height), (41, 35));
    }

    #[test]
    fn roi_is_shifted_in_at_left_and_top_edges() {
        let area = CompletionRegion {
            offset_x: -100,
            offset_y: -100,
            ..CompletionRegion::default()
        };
        let rect = completion_roi((200, 200), Point::new(50, 50), (20, 20), &area).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 0, 50, 50));
    }

    #[test]
    fn roi_fully_outside_is_none() {
        let area = CompletionRegion::default();
        assert!(completion_roi((900, 600), Point::new(400, 300), (20, 20), &area).is_none());
    }
}
