//! Debounce primitive driven by host-supplied time.
//!
//! The host calls [`Debouncer::poll`] from its event loop with the current
//! instant; nothing here spawns timers.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Identifies one scheduled job so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceHandle(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    job: T,
    due: Instant,
    handle: DebounceHandle,
}

/// Holds at most one pending job, pushed back on every reschedule.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
    next_handle: u64,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_handle: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `job` to run `delay` after `now`, replacing any pending job.
    pub fn schedule(&mut self, job: T, now: Instant) -> DebounceHandle {
        let handle = DebounceHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending = Some(Pending {
            job,
            due: now + self.delay,
            handle,
        });
        handle
    }

    /// Cancel the job identified by `handle` if it is still pending.
    pub fn cancel(&mut self, handle: DebounceHandle) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| p.handle == handle) {
            self.pending.take().map(|p| p.job)
        } else {
            None
        }
    }

    /// Cancel whatever is pending.
    pub fn cancel_all(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.job)
    }

    /// Cancel any pending job and hand `job` back for immediate execution.
    pub fn run_now(&mut self, job: T) -> T {
        self.cancel_all();
        job
    }

    /// Take the pending job if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.pending.take().map(|p| p.job)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending job, if any.
    pub fn due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }
}
