//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers and
//! configuration constants used throughout the port.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and DMA buffers
//! - **OS abstraction**: object pool capacities and mailbox depth
//! - **Timing**: Timeouts, delays, and polling intervals
//! - **Interface defaults**: MAC address, PHY address, flags
//!
//! # Note
//!
//! Hardware register bit definitions remain in their respective modules
//! (`register/dma.rs`, `register/mac.rs`) as they are specific to those
//! hardware blocks.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Standard Ethernet MTU (Maximum Transmission Unit)
pub const MTU: usize = 1500;

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// CRC/FCS size at end of frame
pub const CRC_SIZE: usize = 4;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// DMA buffer size per descriptor (word multiple, holds a full frame + CRC)
pub const DEFAULT_BUFFER_SIZE: usize = 1532;

/// Descriptors per ring (TX and RX)
pub const DEFAULT_RING_LEN: usize = 8;

// =============================================================================
// OS Abstraction Capacities
// =============================================================================

/// Mutexes available to the protocol stack
pub const MUTEX_POOL_SIZE: usize = 8;

/// Semaphores available to the protocol stack
pub const SEM_POOL_SIZE: usize = 16;

/// Mailboxes available to the protocol stack
pub const MBOX_POOL_SIZE: usize = 16;

/// Messages per mailbox
pub const MBOX_QUEUE_SIZE: usize = 8;

// =============================================================================
// Timing Constants
// =============================================================================

/// Bound on waits in the interface output path (TX lock, ring reclaim)
pub const BLOCK_TIMEOUT_MS: u32 = 250;

/// ARP cache maintenance period
pub const ARP_TMR_INTERVAL_MS: u32 = 1000;

/// Poll period of the protocol thread host while no job is registered
pub const THREAD_POLL_INTERVAL_MS: u32 = 100;

/// Milliseconds per jiffy
pub const JIFFY_MS: u32 = 10;

/// Default soft reset timeout in milliseconds
pub const SOFT_RESET_TIMEOUT_MS: u32 = 100;

/// Reset poll interval in microseconds
pub const RESET_POLL_INTERVAL_US: u32 = 100;

/// PHY soft reset attempts before giving up
pub const PHY_RESET_ATTEMPTS: u32 = 1000;

// =============================================================================
// Interface Defaults
// =============================================================================

/// Default MAC address
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];

/// Default PHY address on the MDIO bus
pub const DEFAULT_PHY_ADDR: u8 = 0x01;
