//! Clause 22 PHY registers used by the LAN8740 and generic PHY helpers.
//!
//! Only the addresses and bits the drivers read or write are listed.

/// Register addresses
pub mod phy_reg {
    /// Control
    pub const BMCR: u8 = 0;
    /// Status
    pub const BMSR: u8 = 1;
    /// OUI bits 3-18
    pub const PHYIDR1: u8 = 2;
    /// OUI bits 19-24, model and revision
    pub const PHYIDR2: u8 = 3;
    /// Advertised abilities
    pub const ANAR: u8 = 4;
}

/// Control register bits
pub mod bmcr {
    /// Self-clearing soft reset
    pub const RESET: u16 = 0x8000;
    /// 100 Mbps when autonegotiation is off
    pub const SPEED_100: u16 = 0x2000;
    /// Autonegotiation enable
    pub const AN_ENABLE: u16 = 0x1000;
    /// Self-clearing autonegotiation restart
    pub const AN_RESTART: u16 = 0x0200;
}

/// Status register bits
pub mod bmsr {
    /// Can do 100BASE-TX full duplex
    pub const TX_FD_CAPABLE: u16 = 0x4000;
    /// Can do 100BASE-TX half duplex
    pub const TX_HD_CAPABLE: u16 = 0x2000;
    /// Autonegotiation finished
    pub const AN_COMPLETE: u16 = 0x0020;
    /// Can autonegotiate
    pub const AN_ABILITY: u16 = 0x0008;
    /// Link up, latched low until read
    pub const LINK_STATUS: u16 = 0x0004;
}

/// Advertisement register bits
pub mod anar {
    /// Asymmetric pause
    pub const PAUSE_ASYM: u16 = 0x0800;
    /// Symmetric pause
    pub const PAUSE: u16 = 0x0400;
    /// 100BASE-TX full duplex
    pub const TX_FD: u16 = 0x0100;
    /// 100BASE-TX half duplex
    pub const TX_HD: u16 = 0x0080;
    /// Selector field for 802.3
    pub const SELECTOR_IEEE802_3: u16 = 0x0001;
}
