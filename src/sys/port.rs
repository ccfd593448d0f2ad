//! Scheduler/clock seam.
//!
//! Everything that blocks in this crate does so by retrying a non-blocking
//! attempt and handing the CPU back to the scheduler in between, bounded by a
//! millisecond deadline taken from [`Port::now_ms`]. The RTOS glue only has to
//! supply a tick counter and a yield.

use crate::error::{SysError, SysResult};

/// Clock and scheduling hooks supplied by the RTOS.
pub trait Port {
    /// Monotonic millisecond tick. Wraps around at `u32::MAX`.
    fn now_ms(&self) -> u32;

    /// Give up the CPU to other ready tasks.
    fn yield_now(&self);

    /// Suspend the calling task for at least `ms` milliseconds.
    ///
    /// The default spins on [`yield_now`](Port::yield_now); an RTOS with a
    /// real sleep primitive should override it.
    fn sleep_ms(&self, ms: u32) {
        let start = self.now_ms();
        while self.now_ms().wrapping_sub(start) < ms {
            self.yield_now();
        }
    }
}

impl<P: Port + ?Sized> Port for &P {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn yield_now(&self) {
        (**self).yield_now();
    }

    fn sleep_ms(&self, ms: u32) {
        (**self).sleep_ms(ms);
    }
}

/// How long a blocking operation may wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Block until the operation completes
    Forever,
    /// Block for at most this many milliseconds
    Millis(u32),
}

impl Timeout {
    /// Convert a protocol-stack style timeout where `0` means "no timeout".
    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        if ms == 0 { Self::Forever } else { Self::Millis(ms) }
    }

    /// Whether the deadline has passed after `elapsed_ms`.
    #[inline]
    pub const fn expired(self, elapsed_ms: u32) -> bool {
        match self {
            Self::Forever => false,
            Self::Millis(limit) => elapsed_ms >= limit,
        }
    }
}

/// Retry `poll` until it yields a value or `timeout` expires.
///
/// Returns the value together with the number of milliseconds spent waiting
/// (0 when the first attempt succeeded).
pub fn wait_for<P, T, F>(port: &P, timeout: Timeout, mut poll: F) -> SysResult<(T, u32)>
where
    P: Port + ?Sized,
    F: FnMut() -> Option<T>,
{
    let start = port.now_ms();
    loop {
        if let Some(value) = poll() {
            return Ok((value, port.now_ms().wrapping_sub(start)));
        }
        if timeout.expired(port.now_ms().wrapping_sub(start)) {
            return Err(SysError::Timeout);
        }
        port.yield_now();
    }
}
