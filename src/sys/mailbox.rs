//! Bounded FIFO mailbox of opaque messages.

use super::critical::CriticalSectionCell;
use super::pool::PoolObject;
use super::port::{Port, Timeout, wait_for};
use crate::error::{SysError, SysResult};

/// Ring storage behind a [`Mailbox`]
struct Ring<M, const Q: usize> {
    slots: [Option<M>; Q],
    head: usize,
    len: usize,
}

impl<M: Copy, const Q: usize> Ring<M, Q> {
    const fn new() -> Self {
        Self {
            slots: [None; Q],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, msg: M) -> Result<(), M> {
        if self.len == Q {
            return Err(msg);
        }
        self.slots[(self.head + self.len) % Q] = Some(msg);
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<M> {
        if self.len == 0 {
            return None;
        }
        let msg = self.slots[self.head].take();
        self.head = (self.head + 1) % Q;
        self.len -= 1;
        msg
    }
}

/// Fixed-capacity FIFO holding up to `Q` messages.
///
/// `count` is always in `0..=Q`. Posting to a full mailbox blocks (or fails,
/// for the `try_` variant); fetching from an empty one blocks (or fails).
pub struct Mailbox<M, const Q: usize> {
    ring: CriticalSectionCell<Ring<M, Q>>,
}

impl<M: Copy, const Q: usize> Mailbox<M, Q> {
    /// Create an empty mailbox
    pub const fn new() -> Self {
        Self {
            ring: CriticalSectionCell::new(Ring::new()),
        }
    }

    /// Capacity in messages
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        Q
    }

    /// Post without blocking; fails with [`SysError::Full`] when full.
    pub fn try_post(&self, msg: M) -> SysResult<()> {
        self.ring
            .with(|ring| ring.push(msg))
            .map_err(|_| SysError::Full)
    }

    /// Post, waiting up to `timeout` for a free slot.
    pub fn post<P: Port + ?Sized>(&self, port: &P, msg: M, timeout: Timeout) -> SysResult<u32> {
        wait_for(port, timeout, || self.try_post(msg).ok()).map(|((), elapsed)| elapsed)
    }

    /// Fetch without blocking; fails with [`SysError::Empty`] when empty.
    pub fn try_fetch(&self) -> SysResult<M> {
        self.ring.with(Ring::pop).ok_or(SysError::Empty)
    }

    /// Fetch, waiting up to `timeout` for a message.
    ///
    /// Returns the message and the milliseconds spent waiting.
    pub fn fetch<P: Port + ?Sized>(&self, port: &P, timeout: Timeout) -> SysResult<(M, u32)> {
        wait_for(port, timeout, || self.try_fetch().ok())
    }

    /// Discard every pending message, returning how many were dropped
    pub fn drain(&self) -> usize {
        self.ring.with(|ring| {
            let dropped = ring.len;
            while ring.pop().is_some() {}
            dropped
        })
    }

    /// Number of pending messages
    pub fn len(&self) -> usize {
        self.ring.with(|ring| ring.len)
    }

    /// Whether no message is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M: Copy, const Q: usize> Default for Mailbox<M, Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Copy, const Q: usize> PoolObject for Mailbox<M, Q> {
    const INIT: Self = Self::new();
}
