//! Offline collaborators: recorded screenshots in, logged input out.
//!
//! Time is virtual. Waits and input settle delays advance a shared clock
//! instead of sleeping, so a recorded session replays as fast as frames
//! can be matched.

use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tasksweep::config::InputTiming;
use tasksweep::image::io::load_gray_image;
use tasksweep::{
    CancelToken, Frame, FrameSource, InputActuator, Pacer, Point, TaskSweepResult, TriggerSource,
    Triggers,
};

/// Virtual clock shared by the pacer and the input actuator.
pub type Clock = Rc<Cell<Duration>>;

/// Serves the image files of a directory in file-name order.
///
/// Cancels the run once every file was served.
pub struct ReplaySource {
    frames: Vec<PathBuf>,
    next: usize,
    served: Rc<Cell<usize>>,
    cancel: CancelToken,
}

impl ReplaySource {
    pub fn from_dir(dir: &Path, cancel: CancelToken) -> std::io::Result<Self> {
        let mut frames: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
            })
            .collect();
        frames.sort();
        Ok(Self {
            frames,
            next: 0,
            served: Rc::new(Cell::new(0)),
            cancel,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Counter of captures, shared with [`ReplayTriggers`].
    pub fn served(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.served)
    }
}

impl FrameSource for ReplaySource {
    fn capture(&mut self) -> Frame {
        let Some(path) = self.frames.get(self.next) else {
            if !self.cancel.is_cancelled() {
                tracing::info!(frames = self.frames.len(), "replay exhausted, cancelling");
                self.cancel.cancel();
            }
            return Frame::empty();
        };
        self.next += 1;
        self.served.set(self.served.get() + 1);
        match load_gray_image(path) {
            Ok(img) => {
                tracing::debug!(path = %path.display(), "frame served");
                Frame::new(img)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "frame failed to load");
                Frame::empty()
            }
        }
    }
}

/// One recorded input action.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Move { x: i32, y: i32 },
    Click { x: i32, y: i32 },
    Scroll { steps: i32 },
}

/// Logs input actions instead of performing them.
pub struct LoggingInput {
    timing: InputTiming,
    clock: Clock,
    actions: Rc<RefCell<Vec<Action>>>,
}

impl LoggingInput {
    pub fn new(timing: InputTiming, clock: Clock) -> Self {
        Self {
            timing,
            clock,
            actions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn actions(&self) -> Rc<RefCell<Vec<Action>>> {
        Rc::clone(&self.actions)
    }

    fn advance(&self, by: Duration) {
        self.clock.set(self.clock.get() + by);
    }
}

impl InputActuator for LoggingInput {
    fn move_to(&mut self, point: Point) -> TaskSweepResult<()> {
        tracing::info!(x = point.x, y = point.y, "move");
        self.actions.borrow_mut().push(Action::Move {
            x: point.x,
            y: point.y,
        });
        Ok(())
    }

    fn click(&mut self, point: Point) -> TaskSweepResult<()> {
        tracing::info!(x = point.x, y = point.y, "click");
        self.actions.borrow_mut().push(Action::Click {
            x: point.x,
            y: point.y,
        });
        self.advance(self.timing.click_hold + self.timing.click_settle);
        Ok(())
    }

    fn scroll(&mut self, steps: i32) -> TaskSweepResult<()> {
        tracing::info!(steps, wheel = steps * self.timing.wheel_delta, "scroll");
        self.actions.borrow_mut().push(Action::Scroll { steps });
        self.advance(self.timing.scroll_settle);
        Ok(())
    }
}

/// Advances the virtual clock instead of sleeping.
pub struct VirtualPacer {
    clock: Clock,
}

impl VirtualPacer {
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }
}

impl Pacer for VirtualPacer {
    fn wait(&mut self, duration: Duration) {
        self.clock.set(self.clock.get() + duration);
    }

    fn now(&self) -> Duration {
        self.clock.get()
    }
}

/// Starts once, then cancels after the run has sat idle for a few polls.
pub struct ReplayTriggers {
    started: bool,
    served: Rc<Cell<usize>>,
    last_served: usize,
    idle_polls: usize,
    max_idle_polls: usize,
}

impl ReplayTriggers {
    pub fn new(served: Rc<Cell<usize>>, max_idle_polls: usize) -> Self {
        Self {
            started: false,
            served,
            last_served: 0,
            idle_polls: 0,
            max_idle_polls: max_idle_polls.max(1),
        }
    }
}

impl TriggerSource for ReplayTriggers {
    fn poll(&mut self) -> Triggers {
        if !self.started {
            self.started = true;
            return Triggers {
                start: true,
                cancel: false,
            };
        }
        let served = self.served.get();
        if served == self.last_served {
            self.idle_polls += 1;
        } else {
            self.idle_polls = 0;
            self.last_served = served;
        }
        Triggers {
            start: false,
            cancel: self.idle_polls >= self.max_idle_polls,
        }
    }
}
