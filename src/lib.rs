//! STM32H7 Ethernet Network Interface
//!
//! A `no_std`, `no_alloc` OS bridge and Ethernet driver that lets an
//! lwIP-style TCP/IP stack run on a small RTOS on top of the STM32H7
//! Ethernet MAC (Synopsys QoS DMA).
//!
//! # Architecture
//!
//! 1. **OS bridge** ([`sys`]): fixed pools of semaphores, mutexes and
//!    mailboxes behind handles, critical sections, a protocol thread slot
//!    and periodic timers. All blocking goes through the [`sys::Port`] seam.
//! 2. **Interface driver** ([`driver`]): hardware bring-up, the shared TX
//!    path, the interrupt-driven RX worker and the boundary to the stack.
//! 3. **PHY Layer** ([`phy`]): Ethernet PHY drivers (LAN8740)
//! 4. **HAL Layer** ([`hal`]): MDIO bus access
//!
//! ## DMA Descriptor Discipline
//!
//! Descriptors live in fixed rings owned by the driver. Software fills a
//! descriptor and hands it over by setting OWN last, behind a memory
//! barrier; hardware is restarted by moving the ring's tail pointer.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for error and status types
//! - `smoltcp`: Enable smoltcp network stack integration
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_netif::{EthDmaDefault, Lan8740, LinkState, NetifConfig, RxWorker, init};
//! use ph_stm32h7_netif::sys::Semaphore;
//! use ph_stm32h7_netif::unsafe_registers::EthMmio;
//!
//! static mut DMA: EthDmaDefault = EthDmaDefault::new();
//! static RX_SIGNAL: Semaphore = Semaphore::binary();
//! static LINK: LinkState = LinkState::new();
//!
//! let config = NetifConfig::new().with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]);
//! let mut phy = Lan8740::new(config.phy_addr);
//! let parts = init(EthMmio::stm32h7(), port, delay, &mut phy, dma, &config)?;
//!
//! // ETH interrupt
//! on_interrupt(EthMmio::stm32h7(), &RX_SIGNAL);
//!
//! // RX task
//! RxWorker::new(EthMmio::stm32h7(), port, parts.rx, &RX_SIGNAL, &LINK, stack).run();
//!
//! // Any task
//! parts.tx.transmit(&[header, payload])?;
//! ```
//!
//! # Memory Requirements
//!
//! With the default configuration (8 RX and 8 TX descriptors, 1532-byte
//! buffers): about 25 KB of DMA-reachable SRAM (AXI SRAM or SRAM1-3, not DTCM).

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod error;
pub mod hal;
pub mod phy;
pub mod sys;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::{
    Duplex, EthDma, EthDmaDefault, FrameBuffer, InterfaceInfo, InterruptStatus, LinkState,
    NetStack, NetifConfig, NetifFlags, NetifParts, RxStats, RxWorker, Speed, Transmitter,
    TxStats, arp_timer, arp_timer_start, init, on_interrupt,
};
pub use error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result, SysError,
    SysResult,
};

/// Descriptor ring storage, for sizing static DMA memory.
pub mod dma {
    pub use crate::internal::dma::{RxRing, TxRing};
}

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the STM32H7 Ethernet QoS hardware and accept responsibility for
/// correct sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::dma::DmaRegs;
    pub use crate::internal::register::mac::MacRegs;
    pub use crate::internal::register::{ETH_BASE, EthMmio, EthRegisters};
}

// Re-export PHY types
pub use phy::{Lan8740, LinkStatus, PhyDriver};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // Timing
        ARP_TMR_INTERVAL_MS,
        BLOCK_TIMEOUT_MS,
        // Frame/buffer sizes
        CRC_SIZE,
        DEFAULT_BUFFER_SIZE,
        // MAC address
        DEFAULT_MAC_ADDR,
        DEFAULT_PHY_ADDR,
        // Ring length
        DEFAULT_RING_LEN,
        ETH_HEADER_SIZE,
        JIFFY_MS,
        MAC_ADDR_LEN,
        // Pool sizes
        MBOX_POOL_SIZE,
        MBOX_QUEUE_SIZE,
        MTU,
        MUTEX_POOL_SIZE,
        PHY_RESET_ATTEMPTS,
        RESET_POLL_INTERVAL_US,
        SEM_POOL_SIZE,
        SOFT_RESET_TIMEOUT_MS,
        THREAD_POLL_INTERVAL_MS,
    };
}
