//! Tunable constants of the agent.
//!
//! Defaults reproduce the layout and timings of the one target application
//! the agent was built for (a 1920x1080 desktop).

use crate::dedup::DEFAULT_BUCKET_SIZE;
use crate::geometry::Point;
use crate::matcher::MatchConfig;
use crate::suppress::DEFAULT_SUPPRESSION_PAD;
use crate::template::MIN_TEMPLATE_SIDE;
use std::time::Duration;

/// Fixed screen locations that are never discovered by matching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Opens the study page of the selected task.
    pub enter_task: Point,
    /// Pointer position that makes the list under it scroll.
    pub scroll_anchor: Point,
    /// Navigates back to the task list.
    pub return_to_list: Point,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            enter_task: Point::new(1712, 390),
            scroll_anchor: Point::new(1513, 320),
            return_to_list: Point::new(507, 15),
        }
    }
}

/// Where the "already completed" badge sits relative to a duration marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletionRegion {
    /// Horizontal offset from the duration marker center.
    pub offset_x: i32,
    /// Vertical offset from the duration marker center.
    pub offset_y: i32,
    /// Pixels added to the badge size for the search region.
    pub margin: usize,
    /// Minimum side of the search region.
    pub min_side: usize,
}

impl Default for CompletionRegion {
    fn default() -> Self {
        Self {
            offset_x: 544,
            offset_y: -30,
            margin: 20,
            min_side: 50,
        }
    }
}

/// Open-ended scroll search used for the task list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSearchConfig {
    /// Wheel notches per scroll attempt (negative scrolls down).
    pub scroll_steps: i32,
    /// Stop once more than this many scrolls found nothing.
    pub soft_cap: usize,
    /// Never scroll more than this many times.
    pub hard_cap: usize,
    /// Wait after each scroll.
    pub settle: Duration,
}

impl Default for ScrollSearchConfig {
    fn default() -> Self {
        Self {
            scroll_steps: -5,
            soft_cap: 5,
            hard_cap: 10,
            settle: Duration::from_millis(1000),
        }
    }
}

/// Bounded capture / scroll / capture / scroll-back scan of a video list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoPhaseConfig {
    /// Wheel notches scrolled down between the two captures.
    pub scroll_steps: i32,
    /// Wait after each of the two scrolls.
    pub settle: Duration,
    /// Wait after parking the pointer on the scroll anchor.
    pub anchor_settle: Duration,
    /// Vertical dedup bucket across the two captures.
    pub bucket_size: i32,
}

impl Default for TwoPhaseConfig {
    fn default() -> Self {
        Self {
            scroll_steps: 10,
            settle: Duration::from_millis(1500),
            anchor_settle: Duration::from_millis(500),
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Waits inserted by the workflow after its own actions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Delays {
    pub after_task_click: Duration,
    pub after_enter: Duration,
    pub after_video_click: Duration,
    pub after_pass_test: Duration,
    pub after_study_complete: Duration,
    /// Between two polls of a playing video.
    pub poll_interval: Duration,
    pub after_return: Duration,
    pub after_task: Duration,
    /// One tick of the idle supervisor loop.
    pub idle_tick: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            after_task_click: Duration::from_millis(1000),
            after_enter: Duration::from_millis(2000),
            after_video_click: Duration::from_millis(3000),
            after_pass_test: Duration::from_millis(1000),
            after_study_complete: Duration::from_millis(2000),
            poll_interval: Duration::from_millis(1000),
            after_return: Duration::from_millis(2000),
            after_task: Duration::from_millis(1000),
            idle_tick: Duration::from_millis(100),
        }
    }
}

/// Timings an [`InputActuator`](crate::desktop::InputActuator) should honour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputTiming {
    pub click_hold: Duration,
    pub click_settle: Duration,
    pub scroll_settle: Duration,
    /// Wheel units per notch.
    pub wheel_delta: i32,
}

impl Default for InputTiming {
    fn default() -> Self {
        Self {
            click_hold: Duration::from_millis(100),
            click_settle: Duration::from_millis(500),
            scroll_settle: Duration::from_millis(300),
            wheel_delta: 120,
        }
    }
}

/// Full agent configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    pub matching: MatchConfig,
    pub min_template_side: usize,
    pub suppression_pad: i32,
    pub layout: Layout,
    pub completion: CompletionRegion,
    pub list_search: ScrollSearchConfig,
    pub video_scan: TwoPhaseConfig,
    pub delays: Delays,
    pub input: InputTiming,
    /// Give up on a playing video after this long. `None` waits forever.
    pub video_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            min_template_side: MIN_TEMPLATE_SIDE,
            suppression_pad: DEFAULT_SUPPRESSION_PAD,
            layout: Layout::default(),
            completion: CompletionRegion::default(),
            list_search: ScrollSearchConfig::default(),
            video_scan: TwoPhaseConfig::default(),
            delays: Delays::default(),
            input: InputTiming::default(),
            video_timeout: None,
        }
    }
}
