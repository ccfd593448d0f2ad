//! Transmit path.
//!
//! Any number of tasks may call [`Transmitter::transmit`] concurrently. A
//! task-level mutex serializes access to the TX ring; the lock is taken with
//! a bound so a stuck DMA turns into an error instead of a hung stack.
//!
//! Per frame:
//! 1. take the TX lock (bounded, [`IoError::Busy`] on expiry)
//! 2. wait for the slot under the cursor to be software-owned
//!    (bounded, [`DmaError::DescriptorBusy`] on expiry)
//! 3. copy the fragments into the slot buffer and hand the descriptor over
//! 4. clear TBU and move the tail pointer past the new frame
//! 5. wait for the next slot to come back (bounded, counted on expiry)
//! 6. release the lock

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use log::warn;

use super::config::NetifConfig;
use crate::error::{DmaError, IoError, Result};
use crate::internal::dma::TxRing;
use crate::internal::dma::descriptor::publish_barrier;
use crate::internal::register::EthRegisters;
use crate::internal::register::dma::{DMACSR_TBU, DmaRegs};
use crate::sys::{Mutex, Port, Timeout, wait_for};

// =============================================================================
// Statistics
// =============================================================================

/// Transmit counters, updated atomically.
#[derive(Debug, Default)]
pub struct TxStats {
    sent: AtomicU32,
    lock_timeouts: AtomicU32,
    busy: AtomicU32,
    reclaim_timeouts: AtomicU32,
}

impl TxStats {
    /// Frames handed to the DMA
    pub fn sent(&self) -> u32 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Calls that could not take the TX lock in time
    pub fn lock_timeouts(&self) -> u32 {
        self.lock_timeouts.load(Ordering::Relaxed)
    }

    /// Calls that found the cursor slot still owned by the DMA
    pub fn busy(&self) -> u32 {
        self.busy.load(Ordering::Relaxed)
    }

    /// Frames after which the next slot did not come back in time
    pub fn reclaim_timeouts(&self) -> u32 {
        self.reclaim_timeouts.load(Ordering::Relaxed)
    }

    fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// =============================================================================
// Transmitter
// =============================================================================

/// Shared handle to the TX ring.
pub struct Transmitter<'a, R, P, const N: usize, const BUF: usize> {
    dma: DmaRegs<R>,
    port: P,
    lock: Mutex,
    ring: UnsafeCell<&'a mut TxRing<N, BUF>>,
    lock_timeout: Timeout,
    reclaim_timeout: Timeout,
    stats: TxStats,
}

// SAFETY: the ring is only reached through `ring` while `lock` is held.
unsafe impl<R: Sync, P: Sync, const N: usize, const BUF: usize> Sync
    for Transmitter<'_, R, P, N, BUF>
{
}

impl<'a, R, P, const N: usize, const BUF: usize> Transmitter<'a, R, P, N, BUF>
where
    R: EthRegisters,
    P: Port,
{
    /// Wrap an initialized TX ring.
    pub fn new(regs: R, port: P, ring: &'a mut TxRing<N, BUF>, config: &NetifConfig) -> Self {
        Self {
            dma: DmaRegs::new(regs),
            port,
            lock: Mutex::new(),
            ring: UnsafeCell::new(ring),
            lock_timeout: config.tx_lock_timeout(),
            reclaim_timeout: config.tx_reclaim_timeout(),
            stats: TxStats::default(),
        }
    }

    /// Send one frame made of `fragments` (a packet buffer chain).
    ///
    /// Returns the frame length. The frame is in the DMA's hands when this
    /// returns `Ok`, even if the following slot did not free up in time.
    pub fn transmit(&self, fragments: &[&[u8]]) -> Result<usize> {
        let Ok(_guard) = self.lock.lock_guard(&self.port, self.lock_timeout) else {
            TxStats::bump(&self.stats.lock_timeouts);
            return Err(IoError::Busy.into());
        };
        // SAFETY: the TX lock is held until `_guard` drops
        let ring = unsafe { &mut **self.ring.get() };

        if !self.wait_slot_free(ring) {
            TxStats::bump(&self.stats.busy);
            warn!("tx: slot {} still owned by DMA", ring.current_index());
            return Err(DmaError::DescriptorBusy.into());
        }

        let (len, tail) = ring.submit(fragments)?;
        // Descriptor must be visible before the tail pointer kick
        publish_barrier();
        self.dma.clear_status(DMACSR_TBU);
        self.dma.set_tx_tail(tail);
        TxStats::bump(&self.stats.sent);

        if !self.wait_slot_free(ring) {
            TxStats::bump(&self.stats.reclaim_timeouts);
            warn!("tx: slot {} not reclaimed in time", ring.current_index());
        }
        Ok(len)
    }

    // Both the pre-submit and post-kick waits use the reclaim bound
    fn wait_slot_free(&self, ring: &TxRing<N, BUF>) -> bool {
        wait_for(&self.port, self.reclaim_timeout, || ring.current_free().then_some(())).is_ok()
    }

    /// Transmit counters
    pub fn stats(&self) -> &TxStats {
        &self.stats
    }

    /// Whether some task is inside [`transmit`](Self::transmit)
    pub fn is_busy(&self) -> bool {
        self.lock.is_locked()
    }

    /// Number of descriptors in the ring
    pub const fn ring_len(&self) -> usize {
        N
    }

    #[cfg(test)]
    fn ring(&self) -> &TxRing<N, BUF> {
        // SAFETY: test-only, single-threaded inspection
        unsafe { &**self.ring.get() }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
