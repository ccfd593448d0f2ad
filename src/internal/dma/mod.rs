//! DMA descriptor rings
//!
//! Statically sized TX and RX rings for the Ethernet QoS DMA channel. All
//! memory comes from const generics; nothing is allocated at runtime.
//!
//! - [`descriptor`]: 16-byte normal descriptors with the OWN hand-over
//! - [`DescriptorRing`]: circular cursor over a descriptor array
//! - [`TxRing`] / [`RxRing`]: descriptors paired with word-aligned buffers

pub mod buffer;
pub mod descriptor;
pub mod ring;
pub mod rx_ring;
pub mod tx_ring;

pub use buffer::DmaBuffer;
pub use descriptor::{Ownership, RxDescriptor, RxStatus, TxDescriptor};
pub use ring::DescriptorRing;
pub use rx_ring::{RxOutcome, RxRing};
pub use tx_ring::TxRing;
