//! Run-scoped state: cooperative cancellation and the per-iteration context.

use crate::util::{TaskSweepError, TaskSweepResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag.
///
/// Clones observe the same flag. Loops sample it at the top of every
/// iteration and before each simulated input action; once raised it stays
/// raised for the rest of the process.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is raised.
    pub fn check(&self) -> TaskSweepResult<()> {
        if self.is_cancelled() {
            Err(TaskSweepError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Immutable context handed to every scan and workflow call.
///
/// The supervisor replaces it on every outer-loop iteration instead of
/// mutating shared flags; only the cancellation token is shared.
#[derive(Clone, Debug)]
pub struct RunContext {
    cancel: CancelToken,
    iteration: u64,
}

impl RunContext {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            iteration: 0,
        }
    }

    /// Context for the next outer-loop iteration.
    pub fn next(&self) -> Self {
        Self {
            cancel: self.cancel.clone(),
            iteration: self.iteration + 1,
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Checkpoint between workflow steps.
    pub fn check(&self) -> TaskSweepResult<()> {
        self.cancel.check()
    }
}

#[cfg(test)]
mod tests {
    use super::{CancelToken, RunContext};
    use crate::util::TaskSweepError;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let ctx = RunContext::new(token.clone());
        let next = ctx.next();
        assert!(!next.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(next.is_cancelled());
        assert_eq!(next.iteration(), 1);
    }

    #[test]
    fn check_fails_only_after_cancel() {
        let ctx = RunContext::new(CancelToken::new());
        assert_eq!(ctx.check(), Ok(()));
        ctx.cancel_token().cancel();
        assert_eq!(ctx.check(), Err(TaskSweepError::Cancelled));
    }
}
