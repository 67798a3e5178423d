//! External collaborators: screen capture, synthetic input, pacing and
//! start/cancel triggers.
//!
//! The scanning engine and workflow only talk to these traits, so the same
//! code drives a real desktop, a replay of recorded screenshots, or a
//! scripted test double.

use crate::frame::Frame;
use crate::geometry::Point;
use crate::run::CancelToken;
use crate::util::TaskSweepResult;
use std::time::{Duration, Instant};

/// Produces screen snapshots.
pub trait FrameSource {
    /// Captures the current screen, returning [`Frame::empty`] on failure.
    fn capture(&mut self) -> Frame;
}

/// Delivers synthetic pointer input.
///
/// Implementations include their own settle delays: a click holds the
/// button for about 100 ms and settles about 500 ms, a scroll settles about
/// 300 ms.
pub trait InputActuator {
    fn move_to(&mut self, point: Point) -> TaskSweepResult<()>;

    /// Moves to `point`, presses, holds, releases and settles.
    fn click(&mut self, point: Point) -> TaskSweepResult<()>;

    /// Scrolls by `steps` wheel notches; positive scrolls up.
    fn scroll(&mut self, steps: i32) -> TaskSweepResult<()>;
}

/// Suspension points of the workflow.
///
/// Waits after input actions let the target UI settle before the next
/// capture; they are minimum waits, not pacing.
pub trait Pacer {
    fn wait(&mut self, duration: Duration);

    /// Monotonic time since the pacer was created.
    fn now(&self) -> Duration;
}

/// Edge-triggered start and cancel signals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Triggers {
    pub start: bool,
    pub cancel: bool,
}

/// Sampled by the supervisor at the top of each outer iteration.
pub trait TriggerSource {
    fn poll(&mut self) -> Triggers;
}

/// The collaborators one run drives.
pub struct Desktop<S, A, P> {
    pub screen: S,
    pub input: A,
    pub pacer: P,
}

impl<S, A, P> Desktop<S, A, P>
where
    S: FrameSource,
    A: InputActuator,
    P: Pacer,
{
    pub fn new(screen: S, input: A, pacer: P) -> Self {
        Self {
            screen,
            input,
            pacer,
        }
    }

    pub fn capture(&mut self) -> Frame {
        self.screen.capture()
    }

    pub fn wait(&mut self, duration: Duration) {
        self.pacer.wait(duration);
    }

    /// Clicks `point` then waits `settle`.
    pub fn click_and_wait(&mut self, point: Point, settle: Duration) -> TaskSweepResult<()> {
        self.input.click(point)?;
        self.pacer.wait(settle);
        Ok(())
    }
}

/// Real-time pacer that sleeps the current thread.
///
/// Sleeps in short slices and returns early once the token is cancelled, so
/// a cancelled run stops within one slice.
#[derive(Clone, Debug)]
pub struct ThreadPacer {
    started: Instant,
    slice: Duration,
    cancel: CancelToken,
}

impl ThreadPacer {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            started: Instant::now(),
            slice: Duration::from_millis(50),
            cancel,
        }
    }
}

impl Pacer for ThreadPacer {
    fn wait(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.cancel.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(self.slice.min(deadline - now));
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::{Pacer, ThreadPacer};
    use crate::run::CancelToken;
    use std::time::{Duration, Instant};

    #[test]
    fn thread_pacer_returns_early_when_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let mut pacer = ThreadPacer::new(token);
        let start = Instant::now();
        pacer.wait(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn thread_pacer_waits_at_least_the_duration() {
        let mut pacer = ThreadPacer::new(CancelToken::new());
        let before = pacer.now();
        pacer.wait(Duration::from_millis(20));
        assert!(pacer.now() - before >= Duration::from_millis(20));
    }
}
