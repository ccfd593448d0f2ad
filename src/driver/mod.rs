//! Network interface driver for the STM32H7 Ethernet MAC.
//!
//! - [`config`] - Interface configuration and builder methods
//! - [`netif`] - Bring-up of MAC, DMA and PHY; interface description
//! - [`transmit`] - Shared TX path, safe for concurrent senders
//! - [`receive`] - RX worker task fed by the interrupt
//! - [`interrupt`] - DMA interrupt status and the ISR body
//! - [`stack`] - Seam to the protocol stack
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_netif::driver::{EthDmaDefault, LinkState, NetifConfig, RxWorker, init};
//!
//! static mut DMA: EthDmaDefault = EthDmaDefault::new();
//! static RX_SIGNAL: Semaphore = Semaphore::binary();
//! static LINK: LinkState = LinkState::new();
//!
//! let config = NetifConfig::new().with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]);
//! let parts = init(EthMmio::stm32h7(), port, delay, &mut phy, dma, &config)?;
//! let mut worker = RxWorker::new(EthMmio::stm32h7(), port, parts.rx, &RX_SIGNAL, &LINK, stack);
//! ```

pub mod config;
pub mod interrupt;
pub mod netif;
pub mod receive;
pub mod stack;
pub mod transmit;

pub use crate::error;

pub use config::{Duplex, MIN_MTU, NetifConfig, Speed};
pub use interrupt::{InterruptStatus, on_interrupt};
pub use netif::{
    EthDma, EthDmaDefault, InterfaceInfo, LinkState, NetifFlags, NetifParts, arp_timer,
    arp_timer_start, init,
};
pub use receive::{RxStats, RxWorker};
pub use stack::{FrameBuffer, NetStack};
pub use transmit::{Transmitter, TxStats};
