//! Receive worker.
//!
//! One task owns the RX ring. It sleeps on the semaphore the interrupt
//! handler signals, then on every wake-up:
//!
//! 1. reports a fatal DMA bus error and pushes a changed PHY link state
//!    to the stack
//! 2. drains every completed descriptor: clean frames are copied into a
//!    stack buffer and handed over, everything else is counted and dropped,
//!    and each descriptor goes straight back to the DMA
//! 3. acknowledges RBU/RI/NIS, moves the RX tail pointer and unmasks the
//!    normal + receive interrupts

use log::{debug, error, info, warn};

use super::interrupt::InterruptStatus;
use super::netif::LinkState;
use super::stack::{FrameBuffer, NetStack};
use crate::error::SysResult;
use crate::internal::dma::{RxOutcome, RxRing};
use crate::internal::register::EthRegisters;
use crate::internal::register::dma::{
    DMACIER_NIE, DMACIER_RIE, DMACSR_AIS, DMACSR_FBE, DMACSR_NIS, DMACSR_RBU, DMACSR_RI,
    DmaRegs,
};
use crate::sys::{Port, Semaphore, Timeout};

/// Receive counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Frames handed to the stack
    pub delivered: u32,
    /// Frames that spanned descriptors (first/last flag missing)
    pub fragmented: u32,
    /// Frames with the error summary set or a runt length
    pub errored: u32,
    /// Frames dropped because the stack had no buffer
    pub alloc_failures: u32,
    /// Frames the stack refused
    pub input_rejected: u32,
    /// Wake-ups that found the DMA bus error flag set
    pub bus_errors: u32,
}

/// Owner of the RX ring, feeding received frames to the stack.
pub struct RxWorker<'a, R, P, S, const N: usize, const BUF: usize> {
    dma: DmaRegs<R>,
    port: P,
    ring: &'a mut RxRing<N, BUF>,
    signal: &'a Semaphore,
    link: &'a LinkState,
    stack: S,
    stats: RxStats,
}

impl<'a, R, P, S, const N: usize, const BUF: usize> RxWorker<'a, R, P, S, N, BUF>
where
    R: EthRegisters,
    P: Port,
    S: NetStack,
{
    /// Create a worker woken through `signal`.
    pub fn new(
        regs: R,
        port: P,
        ring: &'a mut RxRing<N, BUF>,
        signal: &'a Semaphore,
        link: &'a LinkState,
        stack: S,
    ) -> Self {
        Self {
            dma: DmaRegs::new(regs),
            port,
            ring,
            signal,
            link,
            stack,
            stats: RxStats::default(),
        }
    }

    /// Handle one wake-up. Returns the number of descriptors consumed.
    pub fn service(&mut self) -> usize {
        if let Err(err) = InterruptStatus::from_raw(self.dma.status()).check() {
            self.stats.bus_errors += 1;
            self.dma.clear_status(DMACSR_FBE | DMACSR_AIS);
            error!("rx: {err}");
        }
        self.sync_link();

        let mut consumed = 0;
        let mut tail = None;
        while consumed < N {
            let stack = &mut self.stack;
            let stats = &mut self.stats;
            let Some(((), addr)) = self
                .ring
                .process_current(|outcome| Self::dispatch(stack, stats, outcome))
            else {
                break;
            };
            tail = Some(addr);
            consumed += 1;
        }

        self.dma.clear_status(DMACSR_RBU | DMACSR_RI | DMACSR_NIS);
        if let Some(addr) = tail {
            self.dma.set_rx_tail(addr);
        }
        self.dma.enable_interrupts(DMACIER_NIE | DMACIER_RIE);
        consumed
    }

    /// Wait up to `timeout` for the interrupt, then [`service`](Self::service).
    pub fn wait_and_service(&mut self, timeout: Timeout) -> SysResult<usize> {
        self.signal.wait(&self.port, timeout)?;
        Ok(self.service())
    }

    /// Worker task body.
    pub fn run(&mut self) -> ! {
        loop {
            if let Ok(consumed) = self.wait_and_service(Timeout::Forever) {
                debug!("rx: {consumed} descriptors");
            }
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> RxStats {
        self.stats
    }

    /// The protocol stack fed by this worker
    pub fn stack(&self) -> &S {
        &self.stack
    }

    /// Mutable access to the protocol stack
    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    fn sync_link(&mut self) {
        let up = self.link.is_up();
        if self.stack.link_up() != up {
            info!("rx: link {}", if up { "up" } else { "down" });
            self.stack.set_link(up);
        }
    }

    fn dispatch(stack: &mut S, stats: &mut RxStats, outcome: RxOutcome<'_>) {
        match outcome {
            RxOutcome::Frame(data) => {
                let Some(mut buffer) = stack.alloc(data.len()) else {
                    stats.alloc_failures += 1;
                    warn!("rx: no buffer for {}-byte frame", data.len());
                    return;
                };
                buffer.copy_from(data);
                match stack.input(buffer) {
                    Ok(()) => stats.delivered += 1,
                    Err(buffer) => {
                        stats.input_rejected += 1;
                        warn!("rx: stack rejected {}-byte frame", data.len());
                        stack.release(buffer);
                    }
                }
            }
            RxOutcome::Fragmented(status) => {
                stats.fragmented += 1;
                warn!(
                    "rx: frame spans descriptors (first {}, last {})",
                    status.first, status.last
                );
            }
            RxOutcome::Errored(status) => {
                stats.errored += 1;
                warn!("rx: error frame, length {}", status.packet_len);
            }
        }
    }

    #[cfg(test)]
    fn ring_mut(&mut self) -> &mut RxRing<N, BUF> {
        &mut *self.ring
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::boxed::Box;

    use super::*;
    use crate::error::SysError;
    use crate::internal::dma::descriptor::bits::rdes3;
    use crate::internal::register::dma::{DMACIER_OFFSET, DMACRDTPR_OFFSET, DMACSR_OFFSET};
    use crate::testing::{ManualPort, MockRegisters, MockStack};

    type Ring = RxRing<4, 128>;

    fn ring() -> Box<Ring> {
        let mut ring = Box::new(Ring::new());
        ring.init();
        ring
    }

    /// Emulate the DMA writing `payload` plus a 4-byte CRC into slot `index`
    fn receive(ring: &mut Ring, index: usize, payload: &[u8], flags: u32) {
        ring.buffer_mut(index)[..payload.len()].copy_from_slice(payload);
        ring.descriptor(index).simulate_receive(payload.len() + 4, flags);
    }

    const CLEAN: u32 = rdes3::FD | rdes3::LD;

    // =========================================================================
    // Delivery
    // =========================================================================

    #[test]
    fn clean_frame_is_delivered_without_crc() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, MockStack::new());

        receive(worker.ring_mut(), 0, &[0xDE, 0xAD, 0xBE, 0xEF, 1, 2], CLEAN);
        assert_eq!(worker.service(), 1);

        assert_eq!(worker.stack().frames(), [std::vec![0xDE, 0xAD, 0xBE, 0xEF, 1, 2]]);
        assert_eq!(worker.stats().delivered, 1);
        let first = worker.ring_mut().descriptor(0) as *const _ as usize as u32;
        assert_eq!(regs.read(DMACRDTPR_OFFSET), first);
        assert!(worker.ring_mut().descriptor(0).is_owned());
        assert_eq!(worker.ring_mut().current_index(), 1);
    }

    #[test]
    fn drains_every_completed_descriptor() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, MockStack::new());

        for i in 0..3 {
            receive(worker.ring_mut(), i, &[i as u8; 20], CLEAN);
        }
        assert_eq!(worker.service(), 3);
        assert_eq!(worker.stack().frames().len(), 3);
        assert_eq!(worker.stack().frames()[2], [2u8; 20]);

        // Ring wraps: slots 3 and 0 next
        receive(worker.ring_mut(), 3, &[3; 10], CLEAN);
        receive(worker.ring_mut(), 0, &[4; 10], CLEAN);
        assert_eq!(worker.service(), 2);
        assert_eq!(worker.stats().delivered, 5);
        assert_eq!(worker.ring_mut().current_index(), 1);
    }

    #[test]
    fn idle_service_still_reenables_interrupts() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, MockStack::new());

        regs.raise_status(DMACSR_RI | DMACSR_NIS | DMACSR_RBU);
        assert_eq!(worker.service(), 0);

        assert_eq!(regs.read(DMACSR_OFFSET), 0);
        assert_eq!(regs.read(DMACIER_OFFSET), DMACIER_NIE | DMACIER_RIE);
        assert_eq!(regs.write_count(DMACRDTPR_OFFSET), 0);
    }

    // =========================================================================
    // Error Paths
    // =========================================================================

    #[test]
    fn error_and_fragmented_frames_are_counted_and_rearmed() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, MockStack::new());

        receive(worker.ring_mut(), 0, &[1; 30], CLEAN | rdes3::ES | rdes3::CE);
        receive(worker.ring_mut(), 1, &[2; 30], rdes3::FD);
        receive(worker.ring_mut(), 2, &[3; 30], CLEAN);
        assert_eq!(worker.service(), 3);

        let stats = worker.stats();
        assert_eq!(stats.errored, 1);
        assert_eq!(stats.fragmented, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(worker.stack().frames(), [std::vec![3u8; 30]]);
        for i in 0..3 {
            assert!(worker.ring_mut().descriptor(i).is_owned());
        }
    }

    #[test]
    fn fatal_bus_error_is_counted_once_and_acknowledged() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, MockStack::new());

        regs.raise_status(DMACSR_FBE | DMACSR_AIS);
        assert_eq!(worker.service(), 0);
        assert_eq!(worker.stats().bus_errors, 1);
        assert_eq!(regs.read(DMACSR_OFFSET), 0);

        worker.service();
        assert_eq!(worker.stats().bus_errors, 1);
    }

    #[test]
    fn allocation_failure_drops_frame() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut stack = MockStack::new();
        stack.fail_alloc(true);
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, &mut stack);

        receive(worker.ring_mut(), 0, &[9; 16], CLEAN);
        assert_eq!(worker.service(), 1);
        assert_eq!(worker.stats().alloc_failures, 1);
        assert!(worker.ring_mut().descriptor(0).is_owned());
        drop(worker);
        assert!(stack.frames().is_empty());
    }

    #[test]
    fn rejected_input_releases_buffer() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut stack = MockStack::new();
        stack.fail_input(true);
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, &mut stack);

        receive(worker.ring_mut(), 0, &[9; 16], CLEAN);
        worker.service();
        assert_eq!(worker.stats().input_rejected, 1);
        drop(worker);
        assert_eq!(stack.released(), 1);
        assert!(stack.frames().is_empty());
    }

    // =========================================================================
    // Link Sync and Wake-up
    // =========================================================================

    #[test]
    fn link_changes_reach_stack_once() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, MockStack::new());

        worker.service();
        assert_eq!(worker.stack().link_changes(), 0);

        link.set(true);
        worker.service();
        worker.service();
        assert!(worker.stack().link_up());
        assert_eq!(worker.stack().link_changes(), 1);

        link.set(false);
        worker.service();
        assert!(!worker.stack().link_up());
        assert_eq!(worker.stack().link_changes(), 2);
    }

    #[test]
    fn wait_and_service_needs_a_signal() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let signal = Semaphore::binary();
        let link = LinkState::new();
        let mut ring = ring();
        let mut worker = RxWorker::new(&regs, &port, &mut *ring, &signal, &link, MockStack::new());

        assert_eq!(worker.wait_and_service(Timeout::Millis(5)), Err(SysError::Timeout));

        receive(worker.ring_mut(), 0, &[5; 12], CLEAN);
        signal.signal_from_isr();
        assert_eq!(worker.wait_and_service(Timeout::Millis(5)), Ok(1));
        assert_eq!(worker.stats().delivered, 1);
    }
}
