//! Cancellable scheduled tasks.
//!
//! Turn timeouts are modelled as one-shot tasks keyed by the caller. The
//! production scheduler spawns onto a tokio runtime; tests inject a manual
//! scheduler and fire timers explicitly.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A one-shot task to run when a timer fires.
pub type TimeoutTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle to an armed timer.
pub trait TimeoutHandle: Send + Sync + fmt::Debug {
    /// Disarms the timer. Cancelling a timer that already fired is a no-op.
    fn cancel(&self);
}

/// Arms one-shot timers.
pub trait TimeoutScheduler: Send + Sync {
    /// Runs `task` once after `delay` unless the returned handle is cancelled first.
    fn schedule(&self, delay: Duration, task: TimeoutTask) -> Box<dyn TimeoutHandle>;
}

/// Scheduler backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    /// Creates a scheduler that spawns timers onto `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl TimeoutScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimeoutTask) -> Box<dyn TimeoutHandle> {
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        Box::new(TokioTimeout(join))
    }
}

#[derive(Debug)]
struct TokioTimeout(JoinHandle<()>);

impl TimeoutHandle for TokioTimeout {
    fn cancel(&self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_task_runs_after_delay() {
        let scheduler = TokioScheduler::new(Handle::current());
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let _handle = scheduler.schedule(
            Duration::from_secs(300),
            Box::new(move || flag.store(true, Ordering::SeqCst)),
        );

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let scheduler = TokioScheduler::new(Handle::current());
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let handle = scheduler.schedule(
            Duration::from_secs(1),
            Box::new(move || flag.store(true, Ordering::SeqCst)),
        );
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
