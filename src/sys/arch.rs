//! Synchronization bridge.
//!
//! The narrow OS contract a protocol stack expects from its port: semaphores,
//! mutexes and mailboxes identified by handles, waits with a millisecond
//! timeout where `0` means "forever", plus a clock. Every object comes from a
//! fixed [`ObjectPool`]; exhaustion is reported as
//! [`SysError::OutOfResources`] and counted in [`SysStats`].
//!
//! # Example
//!
//! ```ignore
//! static SYS: SysArchDefault<RtosPort, usize> = SysArch::new(RtosPort);
//!
//! let sem = SYS.sem_new(0)?;
//! // ... in the ISR
//! SYS.sem_signal_from_isr(sem)?;
//! // ... in the task
//! let waited_ms = SYS.sem_wait(sem, 100)?;
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use log::warn;

use super::mailbox::Mailbox;
use super::mutex::Mutex;
use super::pool::{Handle, ObjectPool};
use super::port::{Port, Timeout};
use super::semaphore::Semaphore;
use crate::error::{SysError, SysResult};
use crate::internal::constants::{
    JIFFY_MS, MBOX_POOL_SIZE, MBOX_QUEUE_SIZE, MUTEX_POOL_SIZE, SEM_POOL_SIZE,
};

/// Handle to a pool-backed semaphore
pub type SemHandle = Handle<Semaphore>;

/// Handle to a pool-backed mutex
pub type MutexHandle = Handle<Mutex>;

/// Handle to a pool-backed mailbox
pub type MboxHandle<M, const Q: usize> = Handle<Mailbox<M, Q>>;

/// Bridge sized with the default pool capacities
pub type SysArchDefault<P, M> =
    SysArch<P, M, SEM_POOL_SIZE, MUTEX_POOL_SIZE, MBOX_POOL_SIZE, MBOX_QUEUE_SIZE>;

// =============================================================================
// Statistics
// =============================================================================

/// Usage counters for one object kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatEntry {
    /// Objects currently allocated
    pub used: u32,
    /// High-water mark of `used`
    pub max: u32,
    /// Failed creations (pool exhausted)
    pub err: u32,
}

/// Snapshot of the bridge's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysStats {
    /// Semaphore counters
    pub sem: StatEntry,
    /// Mutex counters
    pub mutex: StatEntry,
    /// Mailbox counters
    pub mbox: StatEntry,
}

struct Counter {
    used: AtomicU32,
    max: AtomicU32,
    err: AtomicU32,
}

impl Counter {
    const fn new() -> Self {
        Self {
            used: AtomicU32::new(0),
            max: AtomicU32::new(0),
            err: AtomicU32::new(0),
        }
    }

    fn created(&self) {
        let used = self.used.fetch_add(1, Ordering::Relaxed) + 1;
        self.max.fetch_max(used, Ordering::Relaxed);
    }

    fn destroyed(&self) {
        // Saturating: a counter never goes below zero
        let _ = self
            .used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    fn failed(&self) {
        self.err.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StatEntry {
        StatEntry {
            used: self.used.load(Ordering::Relaxed),
            max: self.max.load(Ordering::Relaxed),
            err: self.err.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// SysArch
// =============================================================================

/// OS abstraction bridge over fixed object pools.
///
/// - `P`: clock/scheduler port
/// - `M`: mailbox message type (an opaque reference, typically a pointer-sized value)
/// - `SEMS`, `MUTEXES`, `MBOXES`: pool capacities
/// - `Q`: messages per mailbox
pub struct SysArch<
    P,
    M,
    const SEMS: usize,
    const MUTEXES: usize,
    const MBOXES: usize,
    const Q: usize,
> {
    port: P,
    sems: ObjectPool<Semaphore, SEMS>,
    mutexes: ObjectPool<Mutex, MUTEXES>,
    mboxes: ObjectPool<Mailbox<M, Q>, MBOXES>,
    sem_stats: Counter,
    mutex_stats: Counter,
    mbox_stats: Counter,
}

impl<P, M, const SEMS: usize, const MUTEXES: usize, const MBOXES: usize, const Q: usize>
    SysArch<P, M, SEMS, MUTEXES, MBOXES, Q>
where
    P: Port,
    M: Copy,
{
    /// Create the bridge with every pool empty (const, suitable for statics)
    pub const fn new(port: P) -> Self {
        Self {
            port,
            sems: ObjectPool::new(),
            mutexes: ObjectPool::new(),
            mboxes: ObjectPool::new(),
            sem_stats: Counter::new(),
            mutex_stats: Counter::new(),
            mbox_stats: Counter::new(),
        }
    }

    /// The clock/scheduler port
    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    // -------------------------------------------------------------------------
    // Time
    // -------------------------------------------------------------------------

    /// Milliseconds since boot
    #[inline]
    pub fn now_ms(&self) -> u32 {
        self.port.now_ms()
    }

    /// Coarse tick in 10 ms units
    #[inline]
    pub fn jiffies(&self) -> u32 {
        self.port.now_ms() / JIFFY_MS
    }

    /// Sleep the calling task; `0` returns immediately
    pub fn sleep_ms(&self, ms: u32) {
        if ms != 0 {
            self.port.sleep_ms(ms);
        }
    }

    // -------------------------------------------------------------------------
    // Semaphores
    // -------------------------------------------------------------------------

    /// Create a binary semaphore, pre-signaled when `count` is nonzero.
    pub fn sem_new(&self, count: u8) -> SysResult<SemHandle> {
        let Some(handle) = self.sems.allocate() else {
            self.sem_stats.failed();
            return Err(SysError::OutOfResources);
        };
        let sem = self.sem(handle)?;
        sem.clear();
        if count > 0 {
            sem.signal();
        }
        self.sem_stats.created();
        Ok(handle)
    }

    /// Destroy a semaphore, discarding any pending signal.
    pub fn sem_free(&self, handle: SemHandle) -> SysResult<()> {
        if let Some(sem) = self.sems.get(handle) {
            sem.clear();
        }
        self.sems.release(handle)?;
        self.sem_stats.destroyed();
        Ok(())
    }

    /// Signal a semaphore from task context
    pub fn sem_signal(&self, handle: SemHandle) -> SysResult<()> {
        self.sem(handle)?.signal();
        Ok(())
    }

    /// Signal a semaphore from interrupt context.
    ///
    /// Resolving the handle is a single atomic load; no critical section is
    /// entered besides the semaphore's own counter update.
    pub fn sem_signal_from_isr(&self, handle: SemHandle) -> SysResult<()> {
        self.sem(handle)?.signal_from_isr();
        Ok(())
    }

    /// Wait for a semaphore; `timeout_ms == 0` waits forever.
    ///
    /// Returns the milliseconds spent waiting.
    pub fn sem_wait(&self, handle: SemHandle, timeout_ms: u32) -> SysResult<u32> {
        self.sem(handle)?
            .wait(&self.port, Timeout::from_millis(timeout_ms))
    }

    /// Whether `handle` refers to a live semaphore
    pub fn sem_valid(&self, handle: Option<SemHandle>) -> bool {
        handle.is_some_and(|h| self.sems.contains(h))
    }

    fn sem(&self, handle: SemHandle) -> SysResult<&Semaphore> {
        self.sems.get(handle).ok_or(SysError::InvalidHandle)
    }

    // -------------------------------------------------------------------------
    // Mutexes
    // -------------------------------------------------------------------------

    /// Create an unlocked mutex
    pub fn mutex_new(&self) -> SysResult<MutexHandle> {
        let Some(handle) = self.mutexes.allocate() else {
            self.mutex_stats.failed();
            return Err(SysError::OutOfResources);
        };
        self.mutex(handle)?.force_unlock();
        self.mutex_stats.created();
        Ok(handle)
    }

    /// Destroy a mutex.
    ///
    /// A mutex that is still locked is reported, force-unlocked and then
    /// returned to the pool.
    pub fn mutex_free(&self, handle: MutexHandle) -> SysResult<()> {
        if let Some(mutex) = self.mutexes.get(handle) {
            if mutex.is_locked() {
                warn!("sys: freeing locked mutex {handle:?}");
                mutex.force_unlock();
            }
        }
        self.mutexes.release(handle)?;
        self.mutex_stats.destroyed();
        Ok(())
    }

    /// Lock a mutex, waiting as long as it takes
    pub fn mutex_lock(&self, handle: MutexHandle) -> SysResult<()> {
        self.mutex(handle)?.lock(&self.port, Timeout::Forever).map(|_| ())
    }

    /// Lock a mutex; `timeout_ms == 0` waits forever.
    ///
    /// Returns the milliseconds spent waiting.
    pub fn mutex_lock_timeout(&self, handle: MutexHandle, timeout_ms: u32) -> SysResult<u32> {
        self.mutex(handle)?
            .lock(&self.port, Timeout::from_millis(timeout_ms))
    }

    /// Lock a mutex if it is free
    pub fn mutex_try_lock(&self, handle: MutexHandle) -> SysResult<bool> {
        Ok(self.mutex(handle)?.try_lock())
    }

    /// Unlock a mutex. Unlocking an unlocked mutex is reported and ignored.
    pub fn mutex_unlock(&self, handle: MutexHandle) -> SysResult<()> {
        self.mutex(handle)?.unlock();
        Ok(())
    }

    /// Whether `handle` refers to a live mutex
    pub fn mutex_valid(&self, handle: Option<MutexHandle>) -> bool {
        handle.is_some_and(|h| self.mutexes.contains(h))
    }

    fn mutex(&self, handle: MutexHandle) -> SysResult<&Mutex> {
        self.mutexes.get(handle).ok_or(SysError::InvalidHandle)
    }

    // -------------------------------------------------------------------------
    // Mailboxes
    // -------------------------------------------------------------------------

    /// Create an empty mailbox.
    ///
    /// Queue depth is fixed by the const generic `Q`; `_size` is accepted
    /// for API compatibility.
    pub fn mbox_new(&self, _size: usize) -> SysResult<MboxHandle<M, Q>> {
        let Some(handle) = self.mboxes.allocate() else {
            self.mbox_stats.failed();
            return Err(SysError::OutOfResources);
        };
        self.mbox(handle)?.drain();
        self.mbox_stats.created();
        Ok(handle)
    }

    /// Destroy a mailbox.
    ///
    /// Pending messages are reported, discarded, and the slot is released.
    pub fn mbox_free(&self, handle: MboxHandle<M, Q>) -> SysResult<()> {
        if let Some(mbox) = self.mboxes.get(handle) {
            let dropped = mbox.drain();
            if dropped > 0 {
                warn!("sys: freeing mailbox {handle:?} with {dropped} pending messages");
            }
        }
        self.mboxes.release(handle)?;
        self.mbox_stats.destroyed();
        Ok(())
    }

    /// Post a message, waiting for space as long as it takes
    pub fn mbox_post(&self, handle: MboxHandle<M, Q>, msg: M) -> SysResult<()> {
        self.mbox(handle)?
            .post(&self.port, msg, Timeout::Forever)
            .map(|_| ())
    }

    /// Post a message if there is space; fails with [`SysError::Full`]
    pub fn mbox_trypost(&self, handle: MboxHandle<M, Q>, msg: M) -> SysResult<()> {
        self.mbox(handle)?.try_post(msg)
    }

    /// Post from interrupt context; never waits
    pub fn mbox_trypost_from_isr(&self, handle: MboxHandle<M, Q>, msg: M) -> SysResult<()> {
        self.mbox_trypost(handle, msg)
    }

    /// Fetch a message; `timeout_ms == 0` waits forever.
    ///
    /// Returns the message and the milliseconds spent waiting.
    pub fn mbox_fetch(&self, handle: MboxHandle<M, Q>, timeout_ms: u32) -> SysResult<(M, u32)> {
        self.mbox(handle)?
            .fetch(&self.port, Timeout::from_millis(timeout_ms))
    }

    /// Fetch a message if one is pending; fails with [`SysError::Empty`]
    pub fn mbox_tryfetch(&self, handle: MboxHandle<M, Q>) -> SysResult<M> {
        self.mbox(handle)?.try_fetch()
    }

    /// Whether `handle` refers to a live mailbox
    pub fn mbox_valid(&self, handle: Option<MboxHandle<M, Q>>) -> bool {
        handle.is_some_and(|h| self.mboxes.contains(h))
    }

    fn mbox(&self, handle: MboxHandle<M, Q>) -> SysResult<&Mailbox<M, Q>> {
        self.mboxes.get(handle).ok_or(SysError::InvalidHandle)
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    /// Snapshot of the usage counters
    pub fn stats(&self) -> SysStats {
        SysStats {
            sem: self.sem_stats.snapshot(),
            mutex: self.mutex_stats.snapshot(),
            mbox: self.mbox_stats.snapshot(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
