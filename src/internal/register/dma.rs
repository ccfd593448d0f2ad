//! DMA Controller Register Definitions
//!
//! Channel 0 of the Ethernet QoS DMA moves frames between the MTL FIFOs and
//! system memory using descriptor rings. Only the single-channel subset used
//! by this driver is described.

use super::{EthRegisters, reg_bit_ops, reg_rw};

// =============================================================================
// Register Offsets
// =============================================================================

/// DMA Mode Register offset
pub const DMAMR_OFFSET: usize = 0x1000;
/// System Bus Mode Register offset
pub const DMASBMR_OFFSET: usize = 0x1004;
/// Channel Control Register offset
pub const DMACCR_OFFSET: usize = 0x1100;
/// Channel TX Control Register offset
pub const DMACTCR_OFFSET: usize = 0x1104;
/// Channel RX Control Register offset
pub const DMACRCR_OFFSET: usize = 0x1108;
/// Channel TX Descriptor List Address Register offset
pub const DMACTDLAR_OFFSET: usize = 0x1114;
/// Channel RX Descriptor List Address Register offset
pub const DMACRDLAR_OFFSET: usize = 0x111C;
/// Channel TX Descriptor Tail Pointer Register offset
pub const DMACTDTPR_OFFSET: usize = 0x1120;
/// Channel RX Descriptor Tail Pointer Register offset
pub const DMACRDTPR_OFFSET: usize = 0x1128;
/// Channel TX Descriptor Ring Length Register offset
pub const DMACTDRLR_OFFSET: usize = 0x112C;
/// Channel RX Descriptor Ring Length Register offset
pub const DMACRDRLR_OFFSET: usize = 0x1130;
/// Channel Interrupt Enable Register offset
pub const DMACIER_OFFSET: usize = 0x1134;
/// Channel Status Register offset
pub const DMACSR_OFFSET: usize = 0x1160;

// =============================================================================
// Mode / Bus Mode Bits
// =============================================================================

/// Software Reset - resets all MAC and DMA logic, cleared automatically
pub const DMAMR_SWR: u32 = 1 << 0;
/// Fixed burst length
pub const DMASBMR_FB: u32 = 1 << 0;
/// Address-aligned beats
pub const DMASBMR_AAL: u32 = 1 << 12;

// =============================================================================
// Channel TX/RX Control Bits
// =============================================================================

/// Start or stop transmission
pub const DMACTCR_ST: u32 = 1 << 0;
/// Start or stop receive
pub const DMACRCR_SR: u32 = 1 << 0;
/// Receive buffer size field shift
pub const DMACRCR_RBSZ_SHIFT: u32 = 1;
/// Receive buffer size field mask (bits 14:1)
pub const DMACRCR_RBSZ_MASK: u32 = 0x3FFF << 1;

// =============================================================================
// Channel Interrupt Enable Bits
// =============================================================================

/// Transmit interrupt enable
pub const DMACIER_TIE: u32 = 1 << 0;
/// Transmit buffer unavailable enable
pub const DMACIER_TBUE: u32 = 1 << 2;
/// Receive interrupt enable
pub const DMACIER_RIE: u32 = 1 << 6;
/// Receive buffer unavailable enable
pub const DMACIER_RBUE: u32 = 1 << 7;
/// Fatal bus error enable
pub const DMACIER_FBEE: u32 = 1 << 12;
/// Abnormal interrupt summary enable
pub const DMACIER_AIE: u32 = 1 << 14;
/// Normal interrupt summary enable
pub const DMACIER_NIE: u32 = 1 << 15;

// =============================================================================
// Channel Status Bits (write 1 to clear)
// =============================================================================

/// Transmit interrupt
pub const DMACSR_TI: u32 = 1 << 0;
/// Transmit process stopped
pub const DMACSR_TPS: u32 = 1 << 1;
/// Transmit buffer unavailable
pub const DMACSR_TBU: u32 = 1 << 2;
/// Receive interrupt
pub const DMACSR_RI: u32 = 1 << 6;
/// Receive buffer unavailable
pub const DMACSR_RBU: u32 = 1 << 7;
/// Receive process stopped
pub const DMACSR_RPS: u32 = 1 << 8;
/// Early receive interrupt
pub const DMACSR_ERI: u32 = 1 << 11;
/// Fatal bus error
pub const DMACSR_FBE: u32 = 1 << 12;
/// Abnormal interrupt summary
pub const DMACSR_AIS: u32 = 1 << 14;
/// Normal interrupt summary
pub const DMACSR_NIS: u32 = 1 << 15;

// =============================================================================
// Accessor
// =============================================================================

/// Typed access to the DMA registers
pub struct DmaRegs<R> {
    regs: R,
}

impl<R: EthRegisters> DmaRegs<R> {
    /// Wrap a register block
    #[inline(always)]
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    reg_rw!(mode, set_mode, DMAMR_OFFSET, "DMA Mode register");
    reg_rw!(sys_bus_mode, set_sys_bus_mode, DMASBMR_OFFSET, "System Bus Mode register");
    reg_rw!(tx_desc_list, set_tx_desc_list, DMACTDLAR_OFFSET, "TX descriptor list address");
    reg_rw!(rx_desc_list, set_rx_desc_list, DMACRDLAR_OFFSET, "RX descriptor list address");
    reg_rw!(tx_tail, set_tx_tail, DMACTDTPR_OFFSET, "TX descriptor tail pointer");
    reg_rw!(rx_tail, set_rx_tail, DMACRDTPR_OFFSET, "RX descriptor tail pointer");
    reg_rw!(tx_ring_len, set_tx_ring_len, DMACTDRLR_OFFSET, "TX descriptor ring length");
    reg_rw!(rx_ring_len, set_rx_ring_len, DMACRDRLR_OFFSET, "RX descriptor ring length");
    reg_rw!(int_enable, set_int_enable, DMACIER_OFFSET, "channel interrupt enable register");
    reg_rw!(status, set_status, DMACSR_OFFSET, "channel status register");

    reg_bit_ops!(start_tx, stop_tx, DMACTCR_OFFSET, DMACTCR_ST, "TX DMA", "Start", "Stop");
    reg_bit_ops!(start_rx, stop_rx, DMACRCR_OFFSET, DMACRCR_SR, "RX DMA", "Start", "Stop");
    reg_bit_ops!(
        enable_aal,
        disable_aal,
        DMASBMR_OFFSET,
        DMASBMR_AAL,
        "address-aligned beats",
        "Enable",
        "Disable"
    );

    /// Request a software reset of the MAC and DMA
    #[inline(always)]
    pub fn request_reset(&self) {
        self.regs.set_bits(DMAMR_OFFSET, DMAMR_SWR);
    }

    /// Whether a software reset is still in progress
    #[inline(always)]
    pub fn reset_in_progress(&self) -> bool {
        self.mode() & DMAMR_SWR != 0
    }

    /// Program the receive buffer size
    #[inline(always)]
    pub fn set_rx_buffer_size(&self, size: usize) {
        self.regs.modify(DMACRCR_OFFSET, |v| {
            (v & !DMACRCR_RBSZ_MASK) | (((size as u32) << DMACRCR_RBSZ_SHIFT) & DMACRCR_RBSZ_MASK)
        });
    }

    /// Clear status bits (write 1 to clear)
    #[inline(always)]
    pub fn clear_status(&self, bits: u32) {
        self.set_status(bits);
    }

    /// Disable interrupt sources
    #[inline(always)]
    pub fn disable_interrupts(&self, bits: u32) {
        self.regs.clear_bits(DMACIER_OFFSET, bits);
    }

    /// Enable interrupt sources
    #[inline(always)]
    pub fn enable_interrupts(&self, bits: u32) {
        self.regs.set_bits(DMACIER_OFFSET, bits);
    }
}
