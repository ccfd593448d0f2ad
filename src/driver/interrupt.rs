//! Interrupt status handling and the Ethernet interrupt entry point.
//!
//! The interrupt handler does the minimum: it masks the normal interrupt
//! summary so the line stays quiet, then wakes the RX worker through a
//! binary semaphore. Status bits are acknowledged and the summary is
//! re-enabled by the worker once the ring has been drained.

use crate::error::{DmaError, DmaResult};
use crate::internal::register::EthRegisters;
use crate::internal::register::dma::{
    DMACIER_NIE, DMACSR_AIS, DMACSR_ERI, DMACSR_FBE, DMACSR_NIS, DMACSR_RBU, DMACSR_RI,
    DMACSR_RPS, DMACSR_TBU, DMACSR_TI, DMACSR_TPS, DmaRegs,
};
use crate::sys::Semaphore;

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from the DMA channel status register.
///
/// # Example
///
/// ```ignore
/// let status = InterruptStatus::from_raw(dma.status());
/// if status.rx_complete {
///     // Wake the receive worker
/// }
/// if status.has_error() {
///     // Count or log
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// TX complete - frame transmitted
    pub tx_complete: bool,
    /// TX process stopped
    pub tx_stopped: bool,
    /// TX buffer unavailable - DMA found no owned descriptor
    pub tx_buf_unavailable: bool,
    /// RX complete - frame received
    pub rx_complete: bool,
    /// RX buffer unavailable - DMA found no armed descriptor
    pub rx_buf_unavailable: bool,
    /// RX process stopped
    pub rx_stopped: bool,
    /// Early receive - first buffer filled
    pub early_rx: bool,
    /// Fatal bus error - unrecoverable DMA error
    pub fatal_bus_error: bool,
    /// Normal interrupt summary
    pub normal_summary: bool,
    /// Abnormal interrupt summary
    pub abnormal_summary: bool,
}

impl InterruptStatus {
    /// Create from raw DMACSR value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            tx_complete: (status & DMACSR_TI) != 0,
            tx_stopped: (status & DMACSR_TPS) != 0,
            tx_buf_unavailable: (status & DMACSR_TBU) != 0,
            rx_complete: (status & DMACSR_RI) != 0,
            rx_buf_unavailable: (status & DMACSR_RBU) != 0,
            rx_stopped: (status & DMACSR_RPS) != 0,
            early_rx: (status & DMACSR_ERI) != 0,
            fatal_bus_error: (status & DMACSR_FBE) != 0,
            normal_summary: (status & DMACSR_NIS) != 0,
            abnormal_summary: (status & DMACSR_AIS) != 0,
        }
    }

    /// Read the current status of the DMA channel
    #[inline]
    pub fn read<R: EthRegisters>(regs: R) -> Self {
        Self::from_raw(DmaRegs::new(regs).status())
    }

    /// Convert to raw value for clearing (write-1-to-clear)
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let flags = [
            (self.tx_complete, DMACSR_TI),
            (self.tx_stopped, DMACSR_TPS),
            (self.tx_buf_unavailable, DMACSR_TBU),
            (self.rx_complete, DMACSR_RI),
            (self.rx_buf_unavailable, DMACSR_RBU),
            (self.rx_stopped, DMACSR_RPS),
            (self.early_rx, DMACSR_ERI),
            (self.fatal_bus_error, DMACSR_FBE),
            (self.normal_summary, DMACSR_NIS),
            (self.abnormal_summary, DMACSR_AIS),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .fold(0, |acc, (_, bit)| acc | bit)
    }

    /// Check if any interrupt occurred (excluding summary bits)
    #[inline]
    pub fn any(&self) -> bool {
        self.tx_complete
            || self.tx_stopped
            || self.tx_buf_unavailable
            || self.rx_complete
            || self.rx_buf_unavailable
            || self.rx_stopped
            || self.early_rx
            || self.fatal_bus_error
    }

    /// Check if any error occurred
    #[inline]
    pub fn has_error(&self) -> bool {
        self.fatal_bus_error || self.rx_stopped || self.tx_stopped
    }

    /// Fail with [`DmaError::FatalBusError`] if the DMA reported a bus error.
    ///
    /// The channel stops on FBE and only a software reset recovers it.
    #[inline]
    pub fn check(&self) -> DmaResult<()> {
        if self.fatal_bus_error {
            Err(DmaError::FatalBusError)
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Interrupt Entry
// =============================================================================

/// Body of the Ethernet interrupt handler.
///
/// Masks the normal interrupt summary and signals `rx_signal` from interrupt
/// context. Never blocks.
///
/// ```ignore
/// #[interrupt]
/// fn ETH() {
///     ph_stm32h7_netif::driver::on_interrupt(EthMmio::stm32h7(), &RX_SIGNAL);
/// }
/// ```
pub fn on_interrupt<R: EthRegisters>(regs: R, rx_signal: &Semaphore) {
    DmaRegs::new(regs).disable_interrupts(DMACIER_NIE);
    rx_signal.signal_from_isr();
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::dma::{DMACIER_OFFSET, DMACIER_RIE};
    use crate::testing::MockRegisters;

    #[test]
    fn from_raw_parses_receive_bits() {
        let status = InterruptStatus::from_raw(DMACSR_RI | DMACSR_NIS);
        assert!(status.rx_complete);
        assert!(status.normal_summary);
        assert!(!status.tx_complete);
        assert!(!status.has_error());
        assert!(status.any());
    }

    #[test]
    fn to_raw_round_trips_every_flag() {
        let raw = DMACSR_TI
            | DMACSR_TPS
            | DMACSR_TBU
            | DMACSR_RI
            | DMACSR_RBU
            | DMACSR_RPS
            | DMACSR_ERI
            | DMACSR_FBE
            | DMACSR_NIS
            | DMACSR_AIS;
        assert_eq!(InterruptStatus::from_raw(raw).to_raw(), raw);
        assert_eq!(InterruptStatus::default().to_raw(), 0);
    }

    #[test]
    fn summary_bits_alone_are_not_events() {
        let status = InterruptStatus::from_raw(DMACSR_NIS | DMACSR_AIS);
        assert!(!status.any());
    }

    #[test]
    fn fatal_bus_error_is_error() {
        let status = InterruptStatus::from_raw(DMACSR_FBE | DMACSR_AIS);
        assert!(status.has_error());
        assert_eq!(status.check(), Err(DmaError::FatalBusError));
    }

    #[test]
    fn stopped_processes_do_not_fail_check() {
        let status = InterruptStatus::from_raw(DMACSR_RPS | DMACSR_TPS | DMACSR_AIS);
        assert!(status.has_error());
        assert_eq!(status.check(), Ok(()));
    }

    #[test]
    fn read_uses_status_register() {
        let regs = MockRegisters::new();
        regs.raise_status(DMACSR_RBU | DMACSR_AIS);
        let status = InterruptStatus::read(&regs);
        assert!(status.rx_buf_unavailable);
        assert!(status.abnormal_summary);
    }

    #[test]
    fn isr_masks_summary_and_signals() {
        let regs = MockRegisters::new();
        regs.write(DMACIER_OFFSET, DMACIER_NIE | DMACIER_RIE);
        let sem = Semaphore::binary();

        on_interrupt(&regs, &sem);

        assert_eq!(regs.read(DMACIER_OFFSET), DMACIER_RIE);
        assert!(sem.try_take());
        assert!(!sem.try_take());
    }

    #[test]
    fn repeated_interrupts_coalesce() {
        let regs = MockRegisters::new();
        let sem = Semaphore::binary();
        on_interrupt(&regs, &sem);
        on_interrupt(&regs, &sem);
        assert_eq!(sem.count(), 1);
    }
}
