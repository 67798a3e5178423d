//! Outer start/cancel loop with the positional task cursor.

use crate::collector::WorkItem;
use crate::desktop::{Desktop, FrameSource, InputActuator, Pacer, TriggerSource, Triggers};
use crate::run::{CancelToken, RunContext};
use crate::trace::{trace_event, trace_warn};
use crate::workflow::{TaskOutcome, TaskProcessor};

/// What one supervisor iteration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Not running; nothing happened.
    Idle,
    /// Start trigger collected a fresh task list, possibly empty. The first
    /// task is attempted on the following tick, one idle tick later.
    Started { tasks: usize },
    /// One attempt at the task under the cursor.
    Processed { ordinal: usize, outcome: TaskOutcome },
    /// Cursor passed the last task; the run went idle.
    AllDone,
    /// An error stopped the run; it went idle.
    Stopped,
}

/// Why [`Supervisor::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorExit {
    Cancelled,
}

/// Owns the run flag, the task list and the cursor.
///
/// A failed task is retried on the next iteration with the cursor left in
/// place; there is no retry limit. Any error while processing clears the run
/// flag, and only a new start trigger resumes, with a freshly collected list.
pub struct Supervisor<T> {
    processor: TaskProcessor,
    triggers: T,
    cancel: CancelToken,
    tasks: Vec<WorkItem>,
    cursor: usize,
    running: bool,
}

impl<T: TriggerSource> Supervisor<T> {
    pub fn new(processor: TaskProcessor, triggers: T, cancel: CancelToken) -> Self {
        Self {
            processor,
            triggers,
            cancel,
            tasks: Vec::new(),
            cursor: 0,
            running: false,
        }
    }

    pub fn processor(&self) -> &TaskProcessor {
        &self.processor
    }

    pub fn tasks(&self) -> &[WorkItem] {
        &self.tasks
    }

    /// Index of the next task to attempt.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Polls triggers and ticks until cancelled.
    pub fn run<S, A, P>(&mut self, desktop: &mut Desktop<S, A, P>) -> SupervisorExit
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        let mut ctx = RunContext::new(self.cancel.clone());
        loop {
            let triggers = self.triggers.poll();
            if triggers.cancel {
                self.cancel.cancel();
            }
            if ctx.is_cancelled() {
                trace_event!("cancelled, exiting", iteration = ctx.iteration());
                return SupervisorExit::Cancelled;
            }
            let tick = self.tick(desktop, &ctx, triggers);
            if tick != Tick::AllDone {
                desktop.wait(self.processor.config().delays.idle_tick);
            }
            ctx = ctx.next();
        }
    }

    /// One outer-loop iteration.
    ///
    /// A tick does one unit of work: collect the list on start, or attempt
    /// the task under the cursor. Starting therefore delays the first task
    /// by `idle_tick`.
    pub fn tick<S, A, P>(
        &mut self,
        desktop: &mut Desktop<S, A, P>,
        ctx: &RunContext,
        triggers: Triggers,
    ) -> Tick
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        if triggers.start && !self.running {
            return self.start(desktop, ctx);
        }
        if !self.running {
            return Tick::Idle;
        }

        let Some(task) = self.tasks.get(self.cursor).copied() else {
            trace_event!("all tasks done, waiting for start", tasks = self.tasks.len());
            self.running = false;
            return Tick::AllDone;
        };
        trace_event!(
            "processing task",
            ordinal = task.ordinal,
            remaining = self.tasks.len() - self.cursor
        );
        match self.processor.process_task(desktop, &task, ctx) {
            Ok(outcome) => {
                match outcome {
                    TaskOutcome::Completed => self.cursor += 1,
                    TaskOutcome::Failed => {
                        trace_warn!("task not completed, will retry", ordinal = task.ordinal);
                    }
                    TaskOutcome::Cancelled => {
                        return Tick::Processed {
                            ordinal: task.ordinal,
                            outcome,
                        }
                    }
                }
                desktop.wait(self.processor.config().delays.after_task);
                Tick::Processed {
                    ordinal: task.ordinal,
                    outcome,
                }
            }
            Err(err) => {
                let error = err.to_string();
                trace_warn!("run stopped by error", error = error.as_str());
                self.running = false;
                Tick::Stopped
            }
        }
    }

    fn start<S, A, P>(&mut self, desktop: &mut Desktop<S, A, P>, ctx: &RunContext) -> Tick
    where
        S: FrameSource,
        A: InputActuator,
        P: Pacer,
    {
        trace_event!("run started", iteration = ctx.iteration());
        self.running = true;
        self.cursor = 0;
        match self.processor.collect_tasks(desktop, ctx) {
            Ok(tasks) => {
                self.tasks = tasks;
                Tick::Started {
                    tasks: self.tasks.len(),
                }
            }
            Err(err) => {
                let error = err.to_string();
                trace_warn!("task collection failed", error = error.as_str());
                self.tasks.clear();
                self.running = false;
                Tick::Stopped
            }
        }
    }
}
