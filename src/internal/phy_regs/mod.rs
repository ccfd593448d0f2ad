//! PHY Register Definitions
//!
//! Registers of devices reached over MDIO. These are distinct from the
//! memory-mapped Ethernet peripheral registers in [`register`](super::register).
//!
//! - [`standard`] - IEEE 802.3 Clause 22 standard PHY registers (0-15)
//! - [`lan8740`] - LAN8740 vendor-specific registers (16-31)

pub mod lan8740;
pub mod standard;
