//! DMA descriptor bit field constants.
//!
//! Normal (non-context) descriptor formats of the Ethernet QoS DMA. Word 3
//! carries the OWN bit in both the read (software-prepared) and write-back
//! (hardware-completed) formats.

// =============================================================================
// TDES2 / TDES3 (TX Descriptor, read format)
// =============================================================================

/// TX Descriptor Word 2 bit field constants
pub mod tdes2 {
    /// Buffer 1 length mask (bits 13:0)
    pub const B1L_MASK: u32 = 0x3FFF;
    /// Interrupt on completion
    pub const IOC: u32 = 1 << 31;
}

/// TX Descriptor Word 3 bit field constants
pub mod tdes3 {
    /// Frame length mask (bits 14:0)
    pub const FL_MASK: u32 = 0x7FFF;
    /// Error summary (write-back)
    pub const ES: u32 = 1 << 15;
    /// Last descriptor of the frame
    pub const LD: u32 = 1 << 28;
    /// First descriptor of the frame
    pub const FD: u32 = 1 << 29;
    /// Context descriptor
    pub const CTXT: u32 = 1 << 30;
    /// OWN - when set, descriptor owned by DMA; when clear, owned by CPU
    pub const OWN: u32 = 1 << 31;
}

// =============================================================================
// RDES3 (RX Descriptor)
// =============================================================================

/// RX Descriptor Word 3 bit field constants
pub mod rdes3 {
    // Read format (prepared by software)

    /// Buffer 1 address valid
    pub const BUF1V: u32 = 1 << 24;
    /// Buffer 2 address valid
    pub const BUF2V: u32 = 1 << 25;
    /// Interrupt on completion
    pub const IOC: u32 = 1 << 30;

    // Write-back format (completed by hardware)

    /// Packet length mask (bits 14:0), includes CRC
    pub const PL_MASK: u32 = 0x7FFF;
    /// Error summary
    pub const ES: u32 = 1 << 15;
    /// Dribble bit error
    pub const DE: u32 = 1 << 19;
    /// Receive error (RX_ER from PHY)
    pub const RE: u32 = 1 << 20;
    /// Overflow error
    pub const OE: u32 = 1 << 21;
    /// Receive watchdog timeout
    pub const RWT: u32 = 1 << 22;
    /// Giant packet
    pub const GP: u32 = 1 << 23;
    /// CRC error
    pub const CE: u32 = 1 << 24;
    /// Last descriptor of the frame
    pub const LD: u32 = 1 << 28;
    /// First descriptor of the frame
    pub const FD: u32 = 1 << 29;
    /// Context descriptor
    pub const CTXT: u32 = 1 << 30;

    /// OWN - when set, descriptor owned by DMA; when clear, owned by CPU
    pub const OWN: u32 = 1 << 31;

    /// All write-back error bits covered by the error summary
    pub const ALL_ERRORS: u32 = DE | RE | OE | RWT | GP | CE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_bit_is_shared_between_formats() {
        assert_eq!(tdes3::OWN, rdes3::OWN);
        assert_eq!(tdes3::OWN, 0x8000_0000);
    }

    #[test]
    fn rx_length_does_not_overlap_flags() {
        assert_eq!(rdes3::PL_MASK & (rdes3::ES | rdes3::FD | rdes3::LD | rdes3::OWN), 0);
        assert_eq!(rdes3::ALL_ERRORS & rdes3::PL_MASK, 0);
    }

    #[test]
    fn tx_length_fields_cover_buffer() {
        assert!(tdes2::B1L_MASK as usize >= crate::internal::constants::DEFAULT_BUFFER_SIZE);
        assert_eq!(tdes3::FL_MASK & (tdes3::FD | tdes3::LD | tdes3::OWN), 0);
    }
}
