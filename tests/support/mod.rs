//! Shared fixtures: synthetic markers and a scripted desktop.
//!
//! The simulated application has three pages. The task list and the study
//! page are tall canvases seen through a scrollable viewport; the playing
//! page shows the pass-test prompt and the study-complete banner on a
//! schedule counted in captures.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tasksweep::config::{CompletionRegion, Layout};
use tasksweep::geometry::ClippedRect;
use tasksweep::{
    AgentConfig, CancelToken, Desktop, Frame, FrameSource, InputActuator, Marker, OwnedImage,
    Pacer, Point, TaskSweepError, TaskSweepResult, Template, TemplateStore, TriggerSource,
    Triggers,
};

/// Side of every synthetic marker.
pub const TPL: usize = 12;
pub const VIEW_W: usize = 200;
pub const VIEW_H: usize = 120;
pub const BACKGROUND: u8 = 40;

pub const PASS_TEST_AT: Point = Point::new(100, 60);
pub const STUDY_COMPLETE_AT: Point = Point::new(150, 90);

/// Uniform-noise patch; patches from different seeds do not correlate.
pub fn noise_patch(seed: u64, size: usize) -> OwnedImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..size * size).map(|_| rng.random_range(0..=255u8)).collect();
    OwnedImage::new(data, size, size).unwrap()
}

/// Slowly varying patch that keeps its shape when downsampled.
pub fn smooth_patch(size: usize) -> OwnedImage {
    let data = (0..size * size)
        .map(|i| {
            let (x, y) = ((i % size) as f32, (i / size) as f32);
            (128.0 + 90.0 * (x / 9.0).sin() * (y / 11.0).cos()) as u8
        })
        .collect();
    OwnedImage::new(data, size, size).unwrap()
}

pub fn blank(width: usize, height: usize) -> OwnedImage {
    OwnedImage::filled(width, height, BACKGROUND).unwrap()
}

/// Pastes `patch` so that its match center lands on `center`.
pub fn paste(canvas: &mut OwnedImage, patch: &OwnedImage, center: Point) {
    let x = center.x as usize - patch.width() / 2;
    let y = center.y as usize - patch.height() / 2;
    canvas.blit(patch.view(), x, y);
}

pub fn frame_with(width: usize, height: usize, patch: &OwnedImage, centers: &[Point]) -> Frame {
    let mut canvas = blank(width, height);
    for center in centers {
        paste(&mut canvas, patch, *center);
    }
    Frame::new(canvas)
}

pub fn seed_of(marker: Marker) -> u64 {
    match marker {
        Marker::Task => 11,
        Marker::VideoDuration => 12,
        Marker::PassTest => 13,
        Marker::StudyComplete => 14,
        Marker::VideoCompleted => 15,
        Marker::TaskAlt => 16,
    }
}

pub fn patch_of(marker: Marker) -> OwnedImage {
    noise_patch(seed_of(marker), TPL)
}

pub fn template_of(marker: Marker) -> Template {
    Template::new(marker.file_name(), patch_of(marker), 10).unwrap()
}

pub fn full_store() -> TemplateStore {
    Marker::ALL
        .into_iter()
        .fold(TemplateStore::new(), |store, m| store.with(m, template_of(m)))
}

/// Agent configuration scaled down to the 200x120 simulated screen.
pub fn test_config() -> AgentConfig {
    AgentConfig {
        layout: Layout {
            enter_task: Point::new(190, 5),
            scroll_anchor: Point::new(180, 60),
            return_to_list: Point::new(5, 5),
        },
        completion: CompletionRegion {
            offset_x: 80,
            offset_y: -8,
            margin: 6,
            min_side: 20,
        },
        ..AgentConfig::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    TaskList,
    Study,
    Playing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Move(Point),
    Click(Point),
    Scroll(i32),
}

/// Complete state of the simulated application and its observers.
pub struct World {
    pub layout: Layout,
    pub page: Page,
    pub task_list: OwnedImage,
    pub study: OwnedImage,
    pub offset: usize,
    pub px_per_step: usize,
    pub selected: Option<Point>,
    pub return_works: bool,

    pub pass_test_after: Option<usize>,
    pub complete_after: Option<usize>,
    pub playing_captures: usize,
    pub pass_clicked: bool,
    pub passes_clicked: usize,
    pub videos_played: Vec<Point>,

    pub captures: usize,
    pub failing_captures: Vec<usize>,
    pub actions: Vec<Action>,
    pub fail_clicks_after: Option<usize>,

    pub elapsed: Duration,
    pub waits: Vec<Duration>,
    pub click_times: Vec<Duration>,
    pub cancel_at: Option<(Duration, CancelToken)>,
}

impl World {
    pub fn new(layout: Layout, task_list: OwnedImage, study: OwnedImage) -> Self {
        Self {
            layout,
            page: Page::TaskList,
            task_list,
            study,
            offset: 0,
            px_per_step: 6,
            selected: None,
            return_works: true,
            pass_test_after: Some(1),
            complete_after: Some(2),
            playing_captures: 0,
            pass_clicked: false,
            passes_clicked: 0,
            videos_played: Vec::new(),
            captures: 0,
            failing_captures: Vec::new(),
            actions: Vec::new(),
            fail_clicks_after: None,
            elapsed: Duration::ZERO,
            waits: Vec::new(),
            click_times: Vec::new(),
            cancel_at: None,
        }
    }

    pub fn clicks(&self) -> Vec<Point> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Click(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn scrolls(&self) -> Vec<i32> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Scroll(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn canvas(&self) -> &OwnedImage {
        match self.page {
            Page::Study => &self.study,
            _ => &self.task_list,
        }
    }

    fn switch(&mut self, page: Page) {
        self.page = page;
        self.offset = 0;
    }

    fn viewport(&self) -> OwnedImage {
        let canvas = self.canvas();
        let rect = ClippedRect {
            x: 0,
            y: self.offset,
            width: VIEW_W.min(canvas.width()),
            height: VIEW_H.min(canvas.height()),
        };
        OwnedImage::from_view(canvas.view().roi(rect).unwrap()).unwrap()
    }

    fn playing_frame(&mut self) -> OwnedImage {
        let index = self.playing_captures;
        self.playing_captures += 1;
        let mut frame = blank(VIEW_W, VIEW_H);
        if self.pass_test_after.is_some_and(|at| index >= at) && !self.pass_clicked {
            paste(&mut frame, &patch_of(Marker::PassTest), PASS_TEST_AT);
        }
        if self.complete_after.is_some_and(|at| index >= at) {
            paste(&mut frame, &patch_of(Marker::StudyComplete), STUDY_COMPLETE_AT);
            self.page = Page::Study;
        }
        frame
    }

    fn capture(&mut self) -> Frame {
        let index = self.captures;
        self.captures += 1;
        if self.failing_captures.contains(&index) {
            return Frame::empty();
        }
        match self.page {
            Page::Playing => Frame::new(self.playing_frame()),
            _ => Frame::new(self.viewport()),
        }
    }

    fn click(&mut self, point: Point) -> TaskSweepResult<()> {
        if self
            .fail_clicks_after
            .is_some_and(|limit| self.clicks().len() >= limit)
        {
            return Err(TaskSweepError::Input {
                reason: "simulated input failure".to_string(),
            });
        }
        self.actions.push(Action::Click(point));
        self.click_times.push(self.elapsed);
        match self.page {
            Page::TaskList => {
                if point == self.layout.enter_task && self.selected.is_some() {
                    self.switch(Page::Study);
                } else {
                    self.selected = Some(point);
                }
            }
            Page::Study => {
                if point == self.layout.return_to_list {
                    if self.return_works {
                        self.selected = None;
                        self.switch(Page::TaskList);
                    }
                } else {
                    self.videos_played.push(point);
                    self.playing_captures = 0;
                    self.pass_clicked = false;
                    self.page = Page::Playing;
                }
            }
            Page::Playing => {
                if point == PASS_TEST_AT {
                    self.pass_clicked = true;
                    self.passes_clicked += 1;
                }
            }
        }
        Ok(())
    }

    fn scroll(&mut self, steps: i32) {
        self.actions.push(Action::Scroll(steps));
        let max = self.canvas().height().saturating_sub(VIEW_H) as i64;
        let next = self.offset as i64 - i64::from(steps) * self.px_per_step as i64;
        self.offset = next.clamp(0, max) as usize;
    }

    fn wait(&mut self, duration: Duration) {
        self.elapsed += duration;
        self.waits.push(duration);
        if let Some((at, token)) = &self.cancel_at {
            if self.elapsed >= *at {
                token.cancel();
            }
        }
    }
}

pub type Shared = Rc<RefCell<World>>;

pub struct SimScreen(pub Shared);
pub struct SimInput(pub Shared);
pub struct SimPacer(pub Shared);

impl FrameSource for SimScreen {
    fn capture(&mut self) -> Frame {
        self.0.borrow_mut().capture()
    }
}

impl InputActuator for SimInput {
    fn move_to(&mut self, point: Point) -> TaskSweepResult<()> {
        self.0.borrow_mut().actions.push(Action::Move(point));
        Ok(())
    }

    fn click(&mut self, point: Point) -> TaskSweepResult<()> {
        self.0.borrow_mut().click(point)
    }

    fn scroll(&mut self, steps: i32) -> TaskSweepResult<()> {
        self.0.borrow_mut().scroll(steps);
        Ok(())
    }
}

impl Pacer for SimPacer {
    fn wait(&mut self, duration: Duration) {
        self.0.borrow_mut().wait(duration);
    }

    fn now(&self) -> Duration {
        self.0.borrow().elapsed
    }
}

pub type SimDesktop = Desktop<SimScreen, SimInput, SimPacer>;

pub fn desktop(world: World) -> (SimDesktop, Shared) {
    let shared = Rc::new(RefCell::new(world));
    let desktop = Desktop::new(
        SimScreen(Rc::clone(&shared)),
        SimInput(Rc::clone(&shared)),
        SimPacer(Rc::clone(&shared)),
    );
    (desktop, shared)
}

/// Task list with one primary and one alternate task marker.
pub fn task_list_canvas() -> OwnedImage {
    let mut canvas = blank(VIEW_W, VIEW_H);
    paste(&mut canvas, &patch_of(Marker::Task), Point::new(40, 30));
    paste(&mut canvas, &patch_of(Marker::TaskAlt), Point::new(120, 80));
    canvas
}

/// Study page, 200 px tall, with video rows at canvas y 20, 60 and 160.
///
/// The row at 60 carries a completion badge. Scrolling ten steps at six
/// pixels per step reveals the row at 160 at viewport y 100.
pub fn study_canvas(area: &CompletionRegion) -> OwnedImage {
    let mut canvas = blank(VIEW_W, 200);
    let duration = patch_of(Marker::VideoDuration);
    for y in [20, 60, 160] {
        paste(&mut canvas, &duration, Point::new(30, y));
    }
    paste(
        &mut canvas,
        &patch_of(Marker::VideoCompleted),
        Point::new(30, 60).offset(area.offset_x, area.offset_y),
    );
    canvas
}

pub fn standard_world(cfg: &AgentConfig) -> World {
    World::new(cfg.layout, task_list_canvas(), study_canvas(&cfg.completion))
}

/// Trigger source replaying a fixed script, then raising cancel.
pub struct ScriptedTriggers {
    script: VecDeque<Triggers>,
}

impl ScriptedTriggers {
    /// One start trigger followed by `idle` quiet polls.
    pub fn start_then(idle: usize) -> Self {
        let mut script = VecDeque::new();
        script.push_back(Triggers {
            start: true,
            cancel: false,
        });
        script.extend(std::iter::repeat(Triggers::default()).take(idle));
        Self { script }
    }

    pub fn new(script: impl IntoIterator<Item = Triggers>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl TriggerSource for ScriptedTriggers {
    fn poll(&mut self) -> Triggers {
        self.script.pop_front().unwrap_or(Triggers {
            start: false,
            cancel: true,
        })
    }
}
