//! LAN8740 Vendor-Specific Register Definitions
//!
//! Microchip LAN8740A/LAN8740Ai 10/100 PHY (DS00001745).

/// PHY identifier constants
pub mod phy_id {
    /// Full ID: PHYIDR1 = 0x0007, PHYIDR2 = 0xC11x (x = revision)
    pub const ID: u32 = 0x0007_C110;
    /// PHY ID mask (ignores revision bits)
    pub const MASK: u32 = 0xFFFF_FFF0;
}

/// Vendor register addresses
pub mod reg {
    /// Interrupt Source Flag Register (read clears)
    pub const ISFR: u8 = 29;
    /// Interrupt Mask Register
    pub const IMR: u8 = 30;
    /// PHY Special Control/Status Register
    pub const PSCSR: u8 = 31;
}

/// Interrupt source/mask bits, shared by ISFR and IMR
pub mod int {
    /// Auto-negotiation complete
    pub const AN_COMPLETE: u16 = 1 << 6;
    /// Link down
    pub const LINK_DOWN: u16 = 1 << 4;
    /// Auto-negotiation page received
    pub const AN_PAGE_RX: u16 = 1 << 1;
}

/// PHY Special Control/Status Register bits
pub mod pscsr {
    /// Auto-negotiation done
    pub const AUTODONE: u16 = 1 << 12;
    /// Speed indication mask (bits 4:2)
    pub const SPEED_MASK: u16 = 0b111 << 2;
    /// 10BASE-T half duplex
    pub const SPEED_10_HD: u16 = 0b001 << 2;
    /// 100BASE-TX half duplex
    pub const SPEED_100_HD: u16 = 0b010 << 2;
    /// 10BASE-T full duplex
    pub const SPEED_10_FD: u16 = 0b101 << 2;
    /// 100BASE-TX full duplex
    pub const SPEED_100_FD: u16 = 0b110 << 2;
}
