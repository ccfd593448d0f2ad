//! One-shot deadline that the owner re-arms from its callback.
//!
//! Mirrors a protocol stack timeout: it fires once, and whoever handles the
//! expiry schedules the next one.

/// Re-armable millisecond deadline.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTimer {
    interval_ms: u32,
    deadline: Option<u32>,
}

impl PeriodicTimer {
    /// Create a disarmed timer with the given period
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            deadline: None,
        }
    }

    /// Period in milliseconds
    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Schedule the next expiry one period after `now_ms`
    pub fn arm(&mut self, now_ms: u32) {
        self.deadline = Some(now_ms.wrapping_add(self.interval_ms));
    }

    /// Whether an expiry is scheduled
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Report (and disarm) an expiry that is due at `now_ms`.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        match self.deadline {
            // Wrapping comparison: due once `now` has reached the deadline
            Some(deadline) if (now_ms.wrapping_sub(deadline) as i32) >= 0 => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_arm() {
        let mut timer = PeriodicTimer::new(1000);
        assert!(!timer.poll(5000));

        timer.arm(0);
        assert!(!timer.poll(999));
        assert!(timer.poll(1000));
        assert!(!timer.poll(1500));
        assert!(!timer.is_armed());
    }

    #[test]
    fn handles_tick_wraparound() {
        let mut timer = PeriodicTimer::new(100);
        timer.arm(u32::MAX - 10);
        assert!(!timer.poll(u32::MAX));
        assert!(timer.poll(89));
    }
}
