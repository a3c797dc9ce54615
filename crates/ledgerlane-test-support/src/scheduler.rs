//! Manual timeout scheduler — timers fire only when a test says so.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ledgerlane_core::timer::{TimeoutHandle, TimeoutScheduler, TimeoutTask};

struct PendingTimer {
    delay: Duration,
    task: TimeoutTask,
    cancelled: Arc<AtomicBool>,
}

/// A scheduler that records armed timers and runs them on demand.
#[derive(Default, Clone)]
pub struct ManualScheduler {
    pending: Arc<Mutex<Vec<PendingTimer>>>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("armed", &self.armed_count())
            .finish()
    }
}

impl ManualScheduler {
    /// Creates a scheduler with no armed timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers armed and not yet cancelled or fired.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Delays of the timers still armed, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn armed_delays(&self) -> Vec<Duration> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .map(|t| t.delay)
            .collect()
    }

    /// Fires every armed timer and returns how many ran. Cancelled timers are
    /// discarded. Timers armed by the fired tasks stay pending.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fire_all(&self) -> usize {
        let due: Vec<PendingTimer> = std::mem::take(&mut *self.pending.lock().unwrap());
        let mut fired = 0;
        for timer in due {
            if timer.cancelled.swap(true, Ordering::SeqCst) {
                continue;
            }
            (timer.task)();
            fired += 1;
        }
        fired
    }
}

impl TimeoutScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimeoutTask) -> Box<dyn TimeoutHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.pending.lock().unwrap().push(PendingTimer {
            delay,
            task,
            cancelled: Arc::clone(&cancelled),
        });
        Box::new(ManualTimeout { cancelled })
    }
}

#[derive(Debug)]
struct ManualTimeout {
    cancelled: Arc<AtomicBool>,
}

impl TimeoutHandle for ManualTimeout {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
