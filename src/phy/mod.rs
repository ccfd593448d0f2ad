//! Ethernet PHY Drivers
//!
//! The PHY layer only talks to the MDIO bus, so it is independent of the MAC
//! and testable against a mock bus.
//!
//! - [`PhyDriver`]: common driver interface
//! - [`Lan8740`]: Microchip LAN8740A/Ai, the PHY on the target board
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_netif::hal::MdioController;
//! use ph_stm32h7_netif::phy::{Lan8740, PhyDriver};
//!
//! let mut mdio = MdioController::new(EthMmio::stm32h7(), delay);
//! let mut phy = Lan8740::new(1);
//! phy.init(&mut mdio)?;
//!
//! // From a periodic task
//! phy.update_link(&mut mdio, &link_state)?;
//! ```

pub mod generic;
pub mod lan8740;

pub use generic::{LinkStatus, PhyDriver};
pub use lan8740::Lan8740;

pub use crate::internal::phy_regs::standard::{anar, bmcr, bmsr, phy_reg};
