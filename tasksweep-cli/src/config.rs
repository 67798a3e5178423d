//! JSON configuration for the replay command.
//!
//! Every field is optional; missing fields take the library defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tasksweep::config::{
    CompletionRegion, Delays, InputTiming, Layout, ScrollSearchConfig, TwoPhaseConfig,
};
use tasksweep::{AgentConfig, MatchConfig, Point};

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutJson {
    enter_task: [i32; 2],
    scroll_anchor: [i32; 2],
    return_to_list: [i32; 2],
}

impl Default for LayoutJson {
    fn default() -> Self {
        let cfg = Layout::default();
        Self {
            enter_task: [cfg.enter_task.x, cfg.enter_task.y],
            scroll_anchor: [cfg.scroll_anchor.x, cfg.scroll_anchor.y],
            return_to_list: [cfg.return_to_list.x, cfg.return_to_list.y],
        }
    }
}

impl From<&LayoutJson> for Layout {
    fn from(value: &LayoutJson) -> Self {
        let point = |p: [i32; 2]| Point::new(p[0], p[1]);
        Self {
            enter_task: point(value.enter_task),
            scroll_anchor: point(value.scroll_anchor),
            return_to_list: point(value.return_to_list),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionJson {
    offset_x: i32,
    offset_y: i32,
    margin: usize,
    min_side: usize,
}

impl Default for CompletionJson {
    fn default() -> Self {
        let cfg = CompletionRegion::default();
        Self {
            offset_x: cfg.offset_x,
            offset_y: cfg.offset_y,
            margin: cfg.margin,
            min_side: cfg.min_side,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ListSearchJson {
    scroll_steps: i32,
    soft_cap: usize,
    hard_cap: usize,
    settle_ms: u64,
}

impl Default for ListSearchJson {
    fn default() -> Self {
        let cfg = ScrollSearchConfig::default();
        Self {
            scroll_steps: cfg.scroll_steps,
            soft_cap: cfg.soft_cap,
            hard_cap: cfg.hard_cap,
            settle_ms: millis(cfg.settle),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct VideoScanJson {
    scroll_steps: i32,
    settle_ms: u64,
    anchor_settle_ms: u64,
    bucket_size: i32,
}

impl Default for VideoScanJson {
    fn default() -> Self {
        let cfg = TwoPhaseConfig::default();
        Self {
            scroll_steps: cfg.scroll_steps,
            settle_ms: millis(cfg.settle),
            anchor_settle_ms: millis(cfg.anchor_settle),
            bucket_size: cfg.bucket_size,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DelaysJson {
    after_task_click_ms: u64,
    after_enter_ms: u64,
    after_video_click_ms: u64,
    after_pass_test_ms: u64,
    after_study_complete_ms: u64,
    poll_interval_ms: u64,
    after_return_ms: u64,
    after_task_ms: u64,
    idle_tick_ms: u64,
}

impl Default for DelaysJson {
    fn default() -> Self {
        let cfg = Delays::default();
        Self {
            after_task_click_ms: millis(cfg.after_task_click),
            after_enter_ms: millis(cfg.after_enter),
            after_video_click_ms: millis(cfg.after_video_click),
            after_pass_test_ms: millis(cfg.after_pass_test),
            after_study_complete_ms: millis(cfg.after_study_complete),
            poll_interval_ms: millis(cfg.poll_interval),
            after_return_ms: millis(cfg.after_return),
            after_task_ms: millis(cfg.after_task),
            idle_tick_ms: millis(cfg.idle_tick),
        }
    }
}

impl From<&DelaysJson> for Delays {
    fn from(value: &DelaysJson) -> Self {
        Self {
            after_task_click: Duration::from_millis(value.after_task_click_ms),
            after_enter: Duration::from_millis(value.after_enter_ms),
            after_video_click: Duration::from_millis(value.after_video_click_ms),
            after_pass_test: Duration::from_millis(value.after_pass_test_ms),
            after_study_complete: Duration::from_millis(value.after_study_complete_ms),
            poll_interval: Duration::from_millis(value.poll_interval_ms),
            after_return: Duration::from_millis(value.after_return_ms),
            after_task: Duration::from_millis(value.after_task_ms),
            idle_tick: Duration::from_millis(value.idle_tick_ms),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Directory of screenshots, served in file-name order.
    pub frames_dir: String,
    /// Directory holding the marker files `1.png` .. `6.png`.
    pub templates_dir: String,
    pub threshold: f32,
    pub min_template_side: usize,
    pub suppression_pad: i32,
    layout: LayoutJson,
    completion: CompletionJson,
    list_search: ListSearchJson,
    video_scan: VideoScanJson,
    delays: DelaysJson,
    video_timeout_ms: Option<u64>,
    /// Consecutive idle polls without a capture before the replay exits.
    pub idle_polls_before_exit: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        let cfg = AgentConfig::default();
        Self {
            frames_dir: String::new(),
            templates_dir: String::new(),
            threshold: cfg.matching.threshold,
            min_template_side: cfg.min_template_side,
            suppression_pad: cfg.suppression_pad,
            layout: LayoutJson::default(),
            completion: CompletionJson::default(),
            list_search: ListSearchJson::default(),
            video_scan: VideoScanJson::default(),
            delays: DelaysJson::default(),
            video_timeout_ms: None,
            idle_polls_before_exit: 2,
        }
    }
}

impl ReplayConfig {
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            matching: MatchConfig {
                threshold: self.threshold,
                ..MatchConfig::default()
            },
            min_template_side: self.min_template_side,
            suppression_pad: self.suppression_pad,
            layout: Layout::from(&self.layout),
            completion: CompletionRegion {
                offset_x: self.completion.offset_x,
                offset_y: self.completion.offset_y,
                margin: self.completion.margin,
                min_side: self.completion.min_side,
            },
            list_search: ScrollSearchConfig {
                scroll_steps: self.list_search.scroll_steps,
                soft_cap: self.list_search.soft_cap,
                hard_cap: self.list_search.hard_cap,
                settle: Duration::from_millis(self.list_search.settle_ms),
            },
            video_scan: TwoPhaseConfig {
                scroll_steps: self.video_scan.scroll_steps,
                settle: Duration::from_millis(self.video_scan.settle_ms),
                anchor_settle: Duration::from_millis(self.video_scan.anchor_settle_ms),
                bucket_size: self.video_scan.bucket_size,
            },
            delays: Delays::from(&self.delays),
            input: InputTiming::default(),
            video_timeout: self.video_timeout_ms.map(Duration::from_millis),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
