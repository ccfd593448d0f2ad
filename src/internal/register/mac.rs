//! MAC Register Definitions
//!
//! MAC configuration, flow control, address filter and the MDIO station
//! management interface.

use super::{EthRegisters, reg_bit_ops, reg_rw};

// =============================================================================
// Register Offsets
// =============================================================================

/// MAC Configuration Register offset
pub const MACCR_OFFSET: usize = 0x0000;
/// TX Queue 0 Flow Control Register offset
pub const MACQ0TXFCR_OFFSET: usize = 0x0070;
/// RX Flow Control Register offset
pub const MACRXFCR_OFFSET: usize = 0x0090;
/// MAC Interrupt Enable Register offset
pub const MACIER_OFFSET: usize = 0x00B4;
/// MDIO Address Register offset
pub const MACMDIOAR_OFFSET: usize = 0x0200;
/// MDIO Data Register offset
pub const MACMDIODR_OFFSET: usize = 0x0204;
/// MAC Address 0 High Register offset
pub const MACA0HR_OFFSET: usize = 0x0300;
/// MAC Address 0 Low Register offset
pub const MACA0LR_OFFSET: usize = 0x0304;

// =============================================================================
// MAC Configuration Bits
// =============================================================================

/// Receiver enable
pub const MACCR_RE: u32 = 1 << 0;
/// Transmitter enable
pub const MACCR_TE: u32 = 1 << 1;
/// Duplex mode (full duplex if set)
pub const MACCR_DM: u32 = 1 << 13;
/// Fast Ethernet speed (100 Mbps if set)
pub const MACCR_FES: u32 = 1 << 14;

// =============================================================================
// Flow Control Bits
// =============================================================================

/// Transmit flow control enable
pub const MACQ0TXFCR_TFE: u32 = 1 << 1;
/// Receive flow control enable
pub const MACRXFCR_RFE: u32 = 1 << 0;

// =============================================================================
// MDIO Address Register Bits
// =============================================================================

/// MII busy - set to start an operation, cleared by hardware when done
pub const MACMDIOAR_MB: u32 = 1 << 0;
/// MII operation command shift (bits 3:2)
pub const MACMDIOAR_GOC_SHIFT: u32 = 2;
/// MII operation command mask
pub const MACMDIOAR_GOC_MASK: u32 = 0x3 << 2;
/// Write command
pub const MACMDIOAR_GOC_WRITE: u32 = 0x1 << 2;
/// Read command
pub const MACMDIOAR_GOC_READ: u32 = 0x3 << 2;
/// CSR clock range shift (bits 11:8)
pub const MACMDIOAR_CR_SHIFT: u32 = 8;
/// CSR clock range mask
pub const MACMDIOAR_CR_MASK: u32 = 0xF << 8;
/// Register/device address shift (bits 20:16)
pub const MACMDIOAR_RDA_SHIFT: u32 = 16;
/// Register/device address mask
pub const MACMDIOAR_RDA_MASK: u32 = 0x1F << 16;
/// Physical layer address shift (bits 25:21)
pub const MACMDIOAR_PA_SHIFT: u32 = 21;
/// Physical layer address mask
pub const MACMDIOAR_PA_MASK: u32 = 0x1F << 21;

/// MDIO data field mask
pub const MACMDIODR_MD_MASK: u32 = 0xFFFF;

// =============================================================================
// Accessor
// =============================================================================

/// Typed access to the MAC registers
pub struct MacRegs<R> {
    regs: R,
}

impl<R: EthRegisters> MacRegs<R> {
    /// Wrap a register block
    #[inline(always)]
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    reg_rw!(config, set_config, MACCR_OFFSET, "MAC Configuration register");
    reg_rw!(int_enable, set_int_enable, MACIER_OFFSET, "MAC interrupt enable register");
    reg_rw!(mdio_address, set_mdio_address, MACMDIOAR_OFFSET, "MDIO Address register");
    reg_rw!(mdio_data, set_mdio_data, MACMDIODR_OFFSET, "MDIO Data register");
    reg_rw!(addr0_high, set_addr0_high, MACA0HR_OFFSET, "MAC Address 0 High register");
    reg_rw!(addr0_low, set_addr0_low, MACA0LR_OFFSET, "MAC Address 0 Low register");

    reg_bit_ops!(enable_tx, disable_tx, MACCR_OFFSET, MACCR_TE, "transmitter", "Enable", "Disable");
    reg_bit_ops!(enable_rx, disable_rx, MACCR_OFFSET, MACCR_RE, "receiver", "Enable", "Disable");
    reg_bit_ops!(
        enable_tx_flow_control,
        disable_tx_flow_control,
        MACQ0TXFCR_OFFSET,
        MACQ0TXFCR_TFE,
        "transmit flow control",
        "Enable",
        "Disable"
    );
    reg_bit_ops!(
        enable_rx_flow_control,
        disable_rx_flow_control,
        MACRXFCR_OFFSET,
        MACRXFCR_RFE,
        "receive flow control",
        "Enable",
        "Disable"
    );

    /// Program speed and duplex bits
    pub fn set_speed_duplex(&self, fast: bool, full_duplex: bool) {
        self.regs.modify(MACCR_OFFSET, |mut v| {
            v &= !(MACCR_FES | MACCR_DM);
            if fast {
                v |= MACCR_FES;
            }
            if full_duplex {
                v |= MACCR_DM;
            }
            v
        });
    }

    /// Program the primary MAC address filter
    pub fn set_mac_address(&self, addr: &[u8; 6]) {
        let high = ((addr[5] as u32) << 8) | (addr[4] as u32);
        let low = ((addr[3] as u32) << 24)
            | ((addr[2] as u32) << 16)
            | ((addr[1] as u32) << 8)
            | (addr[0] as u32);
        self.set_addr0_high(high);
        self.set_addr0_low(low);
    }

    /// Read back the primary MAC address
    pub fn mac_address(&self) -> [u8; 6] {
        let high = self.addr0_high();
        let low = self.addr0_low();
        [
            low as u8,
            (low >> 8) as u8,
            (low >> 16) as u8,
            (low >> 24) as u8,
            high as u8,
            (high >> 8) as u8,
        ]
    }

    /// Whether an MDIO operation is in progress
    #[inline(always)]
    pub fn mdio_busy(&self) -> bool {
        self.mdio_address() & MACMDIOAR_MB != 0
    }
}
