//! Counting semaphore with an interrupt-safe signal.

use core::cell::Cell;

use critical_section::Mutex;

use super::pool::PoolObject;
use super::port::{Port, Timeout, wait_for};
use crate::error::SysResult;

/// Counting semaphore saturating at `max`.
///
/// Pool-backed semaphores are binary (`max == 1`): repeated signals before a
/// wait collapse into one, matching event-flag semantics.
pub struct Semaphore {
    count: Mutex<Cell<u32>>,
    max: u32,
}

impl Semaphore {
    /// Binary semaphore, initially unsignaled
    pub const fn binary() -> Self {
        Self::counting(0, 1)
    }

    /// Counting semaphore with an initial count and an upper bound
    pub const fn counting(initial: u32, max: u32) -> Self {
        let max = if max == 0 { 1 } else { max };
        let initial = if initial > max { max } else { initial };
        Self {
            count: Mutex::new(Cell::new(initial)),
            max,
        }
    }

    /// Add one signal. Never blocks; a saturated semaphore stays saturated.
    #[inline]
    pub fn signal(&self) {
        critical_section::with(|cs| {
            let count = self.count.borrow(cs);
            if count.get() < self.max {
                count.set(count.get() + 1);
            }
        });
    }

    /// Signal from interrupt context.
    ///
    /// Touches only this semaphore's own counter: no pool lookup, no
    /// scheduler call, constant time.
    #[inline]
    pub fn signal_from_isr(&self) {
        self.signal();
    }

    /// Consume one signal if present.
    #[inline]
    pub fn try_take(&self) -> bool {
        critical_section::with(|cs| {
            let count = self.count.borrow(cs);
            match count.get() {
                0 => false,
                n => {
                    count.set(n - 1);
                    true
                }
            }
        })
    }

    /// Wait for a signal.
    ///
    /// Returns the milliseconds spent waiting, or [`SysError::Timeout`]
    /// if no signal arrived in time.
    ///
    /// [`SysError::Timeout`]: crate::error::SysError::Timeout
    pub fn wait<P: Port + ?Sized>(&self, port: &P, timeout: Timeout) -> SysResult<u32> {
        wait_for(port, timeout, || self.try_take().then_some(())).map(|((), elapsed)| elapsed)
    }

    /// Drop any pending signals
    #[inline]
    pub fn clear(&self) {
        critical_section::with(|cs| self.count.borrow(cs).set(0));
    }

    /// Number of pending signals
    #[inline]
    pub fn count(&self) -> u32 {
        critical_section::with(|cs| self.count.borrow(cs).get())
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::binary()
    }
}

impl PoolObject for Semaphore {
    const INIT: Self = Self::binary();
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::error::SysError;
    use crate::testing::{ManualPort, StdPort};
    use std::time::{Duration, Instant};

    #[test]
    fn binary_signals_collapse() {
        let sem = Semaphore::binary();
        sem.signal();
        sem.signal();
        assert_eq!(sem.count(), 1);
        assert!(sem.try_take());
        assert!(!sem.try_take());
    }

    #[test]
    fn counting_respects_bounds() {
        let sem = Semaphore::counting(5, 3);
        assert_eq!(sem.count(), 3);
        sem.signal();
        assert_eq!(sem.count(), 3);
        sem.clear();
        assert_eq!(sem.count(), 0);
    }

    #[test]
    fn signaled_wait_returns_immediately() {
        let sem = Semaphore::binary();
        sem.signal_from_isr();
        assert_eq!(sem.wait(&ManualPort::new(), Timeout::Millis(10)), Ok(0));
    }

    #[test]
    fn timed_wait_expires_without_signal() {
        let port = StdPort::new();
        let sem = Semaphore::binary();

        let start = Instant::now();
        assert_eq!(sem.wait(&port, Timeout::Millis(30)), Err(SysError::Timeout));
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(29), "returned early: {waited:?}");
        assert!(waited < Duration::from_secs(2));
    }

    #[test]
    fn forever_wait_blocks_until_signal() {
        let port = StdPort::new();
        let sem = Semaphore::binary();

        std::thread::scope(|s| {
            s.spawn(|| {
                std::thread::sleep(Duration::from_millis(40));
                sem.signal();
            });
            let elapsed = sem.wait(&port, Timeout::Forever).unwrap();
            assert!(elapsed >= 30, "woke after {elapsed} ms without a signal");
        });
        assert_eq!(sem.count(), 0);
    }
}
