//! Protocol thread slot.
//!
//! The protocol stack asks the OS layer for exactly one thread (its core
//! "tcpip" thread). The RTOS task that hosts it is created statically, so
//! spawning just records the entry point; the hosting task picks it up.

use super::critical::CriticalSectionCell;
use super::port::Port;
use crate::internal::constants::THREAD_POLL_INTERVAL_MS;

/// Thread entry point as the protocol stack supplies it
pub type ThreadFn = fn(usize);

#[derive(Clone, Copy)]
struct Job {
    entry: ThreadFn,
    arg: usize,
}

/// Single-job slot bridging `thread_new` to a statically created task.
pub struct ThreadSlot {
    job: CriticalSectionCell<Option<Job>>,
}

impl ThreadSlot {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            job: CriticalSectionCell::new(None),
        }
    }

    /// Record the thread entry point and its argument.
    ///
    /// A later call replaces a job that has not been picked up yet.
    pub fn spawn(&self, entry: ThreadFn, arg: usize) {
        self.job.with(|job| *job = Some(Job { entry, arg }));
    }

    /// Whether a job is waiting to run
    pub fn is_pending(&self) -> bool {
        self.job.with(|job| job.is_some())
    }

    /// Take the pending job and run it, if any.
    ///
    /// Returns whether a job ran.
    pub fn run_pending(&self) -> bool {
        match self.job.with(Option::take) {
            Some(job) => {
                (job.entry)(job.arg);
                true
            }
            None => false,
        }
    }

    /// Body of the hosting task: sleep until a job arrives, then run it.
    pub fn run<P: Port + ?Sized>(&self, port: &P) -> ! {
        loop {
            if !self.run_pending() {
                port.sleep_ms(THREAD_POLL_INTERVAL_MS);
            }
        }
    }
}

impl Default for ThreadSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static SEEN: AtomicUsize = AtomicUsize::new(0);

    fn record(arg: usize) {
        SEEN.store(arg, Ordering::SeqCst);
    }

    #[test]
    fn spawned_job_runs_once() {
        let slot = ThreadSlot::new();
        assert!(!slot.run_pending());

        slot.spawn(record, 42);
        assert!(slot.is_pending());
        assert!(slot.run_pending());
        assert_eq!(SEEN.load(Ordering::SeqCst), 42);

        assert!(!slot.is_pending());
        assert!(!slot.run_pending());
    }
}
