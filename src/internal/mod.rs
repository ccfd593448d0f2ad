//! Internal Implementation Details
//!
//! Hardware-facing building blocks shared by the driver layers.
//!
//! - [`constants`]: sizes, timeouts and pool dimensions
//! - [`register`]: memory-mapped Ethernet QoS registers and the [`register::EthRegisters`] seam
//! - [`phy_regs`]: IEEE 802.3 and LAN8740 PHY register definitions
//! - [`dma`]: descriptors and descriptor rings

pub mod constants;
pub mod dma;
pub mod phy_regs;
pub mod register;
