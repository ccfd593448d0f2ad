//! Hardware Abstraction Layer
//!
//! Higher-level access to the MAC than raw register pokes.
//!
//! # Modules
//!
//! - [`mdio`]: MDIO/SMI bus for PHY communication
//!
//! # Delay Integration
//!
//! Busy-bit polling uses `embedded_hal::delay::DelayNs`. Pass any delay
//! implementation from your HAL.

pub mod mdio;

pub use mdio::{MAX_PHY_ADDR, MAX_REG_ADDR, MdcClockDivider, MdioBus, MdioController};
