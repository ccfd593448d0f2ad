//! Critical section guard.
//!
//! Short, nestable protected regions built on the `critical-section` crate.
//! The implementation (interrupt masking on a single core, or an RTOS lock) is
//! supplied by the HAL or RTOS crate through `critical_section::set_impl!`.
//!
//! Three flavours are provided:
//!
//! - [`protect`]/[`unprotect`]: explicit save/restore pair, for callers that
//!   need to carry the saved state across a call boundary
//! - [`CriticalGuard`]: RAII wrapper that restores on drop
//! - [`CriticalSectionCell`]: interior mutability for state shared with ISRs

use core::cell::RefCell;
use core::marker::PhantomData;

use critical_section::{Mutex, RestoreState};

// =============================================================================
// Save / Restore
// =============================================================================

/// Interrupt state saved by [`protect`].
///
/// Must be handed back to [`unprotect`] exactly once, in reverse order of
/// acquisition when nested.
#[must_use = "the saved state must be passed to `unprotect`"]
pub struct ProtectState {
    state: RestoreState,
    // Restoring on another execution context would corrupt the nesting order
    _not_send: PhantomData<*const ()>,
}

/// Enter a protected region and return the previous protection state.
///
/// May be called while already protected; the returned state then records
/// that the region was already active and [`unprotect`] leaves it active.
#[inline]
pub fn protect() -> ProtectState {
    // SAFETY: the returned state is released exactly once by `unprotect`,
    // and `ProtectState` is neither `Copy` nor `Send`.
    let state = unsafe { critical_section::acquire() };
    ProtectState {
        state,
        _not_send: PhantomData,
    }
}

/// Leave a protected region, restoring the state saved by [`protect`].
#[inline]
pub fn unprotect(saved: ProtectState) {
    // SAFETY: `saved` came from `protect` and is consumed here.
    unsafe { critical_section::release(saved.state) }
}

/// RAII critical section: protected from construction until drop.
///
/// ```ignore
/// {
///     let _guard = CriticalGuard::enter();
///     // interrupts masked here
/// }
/// ```
pub struct CriticalGuard {
    saved: Option<ProtectState>,
}

impl CriticalGuard {
    /// Enter a protected region.
    #[inline]
    pub fn enter() -> Self {
        Self {
            saved: Some(protect()),
        }
    }
}

impl Drop for CriticalGuard {
    #[inline]
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            unprotect(saved);
        }
    }
}

// =============================================================================
// CriticalSectionCell
// =============================================================================

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both task code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }
}

// SAFETY: CriticalSectionCell uses critical sections to protect all access.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protect_unprotect_pair() {
        let saved = protect();
        unprotect(saved);

        // A second region can be entered after the first has been left
        let saved = protect();
        unprotect(saved);
    }

    #[test]
    fn guard_releases_on_drop() {
        {
            let _guard = CriticalGuard::enter();
        }
        let cell = CriticalSectionCell::new(1u32);
        assert_eq!(cell.with(|v| *v), 1);
    }

    #[test]
    fn cell_with_mutates() {
        let cell = CriticalSectionCell::new(0u32);
        cell.with(|v| *v += 5);
        cell.with(|v| *v *= 2);
        assert_eq!(cell.with(|v| *v), 10);
    }

    #[test]
    fn cell_try_with_rejects_reentrant_borrow() {
        let cell = CriticalSectionCell::new(0u32);
        let nested = cell.with(|_| cell.try_with(|v| *v));
        assert!(nested.is_none());
        assert_eq!(cell.try_with(|v| *v), Some(0));
    }
}
