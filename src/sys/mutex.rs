//! Task-level mutual exclusion lock.
//!
//! Unlike `critical_section::Mutex`, holding this lock does not mask
//! interrupts; contending tasks yield while they wait.

use core::cell::Cell;

use critical_section::Mutex as CsMutex;
use log::warn;

use super::pool::PoolObject;
use super::port::{Port, Timeout, wait_for};
use crate::error::SysResult;

/// Non-recursive lock owned by at most one task at a time.
pub struct Mutex {
    locked: CsMutex<Cell<bool>>,
}

impl Mutex {
    /// Create an unlocked mutex
    pub const fn new() -> Self {
        Self {
            locked: CsMutex::new(Cell::new(false)),
        }
    }

    /// Take the lock if it is free.
    #[inline]
    pub fn try_lock(&self) -> bool {
        critical_section::with(|cs| {
            let locked = self.locked.borrow(cs);
            if locked.get() {
                false
            } else {
                locked.set(true);
                true
            }
        })
    }

    /// Take the lock, waiting up to `timeout`.
    ///
    /// Returns the milliseconds spent waiting.
    pub fn lock<P: Port + ?Sized>(&self, port: &P, timeout: Timeout) -> SysResult<u32> {
        wait_for(port, timeout, || self.try_lock().then_some(())).map(|((), elapsed)| elapsed)
    }

    /// Take the lock and return a guard that releases it on drop.
    pub fn lock_guard<P: Port + ?Sized>(
        &self,
        port: &P,
        timeout: Timeout,
    ) -> SysResult<MutexGuard<'_>> {
        self.lock(port, timeout)?;
        Ok(MutexGuard { mutex: self })
    }

    /// Release the lock.
    ///
    /// Unlocking a mutex that is not locked is reported and otherwise
    /// ignored. Returns whether the lock was held.
    pub fn unlock(&self) -> bool {
        let was_locked = self.release();
        if !was_locked {
            warn!("mutex: unlock of unlocked mutex");
        }
        was_locked
    }

    /// Release the lock regardless of owner, without diagnostics.
    ///
    /// Used for cleanup when the owner can no longer unlock, e.g. when a
    /// locked mutex is destroyed.
    #[inline]
    pub fn force_unlock(&self) {
        self.release();
    }

    /// Whether some task currently holds the lock
    #[inline]
    pub fn is_locked(&self) -> bool {
        critical_section::with(|cs| self.locked.borrow(cs).get())
    }

    fn release(&self) -> bool {
        critical_section::with(|cs| self.locked.borrow(cs).replace(false))
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolObject for Mutex {
    const INIT: Self = Self::new();
}

/// Lock held until the guard is dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct MutexGuard<'a> {
    mutex: &'a Mutex,
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        self.mutex.release();
    }
}
