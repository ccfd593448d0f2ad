//! Receive descriptor ring with its frame buffers.

use core::sync::atomic::{Ordering, fence};

use super::buffer::DmaBuffer;
use super::descriptor::{RxDescriptor, RxStatus};
use super::ring::DescriptorRing;
use crate::internal::constants::CRC_SIZE;

/// What the DMA left in a completed descriptor.
#[derive(Debug, PartialEq, Eq)]
pub enum RxOutcome<'a> {
    /// Clean single-descriptor frame, CRC stripped
    Frame(&'a [u8]),
    /// Frame did not fit in one descriptor (first/last flags not both set)
    Fragmented(RxStatus),
    /// Hardware flagged the frame (error summary or runt length)
    Errored(RxStatus),
}

/// Receive ring: `N` descriptors, each backed by one `BUF`-byte buffer.
///
/// The ring and its buffers must live in DMA-reachable memory and stay in
/// place after [`init`](Self::init).
pub struct RxRing<const N: usize, const BUF: usize> {
    ring: DescriptorRing<RxDescriptor, N>,
    buffers: [DmaBuffer<BUF>; N],
}

impl<const N: usize, const BUF: usize> RxRing<N, BUF> {
    /// Create a ring; descriptors stay software-owned until [`init`](Self::init).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: DescriptorRing::from_array([const { RxDescriptor::new() }; N]),
            buffers: [const { DmaBuffer::new() }; N],
        }
    }

    /// Arm every descriptor with its buffer and move the cursor to slot 0.
    pub fn init(&mut self) {
        for (desc, buffer) in self.ring.iter().zip(self.buffers.iter()) {
            desc.arm(buffer.addr());
        }
        self.ring.reset();
    }

    /// Number of slots.
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false for a non-empty ring.
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Size of each receive buffer, for the RBSZ field.
    #[inline(always)]
    #[must_use]
    pub const fn buffer_size(&self) -> usize {
        BUF
    }

    /// Bus address of descriptor 0.
    #[must_use]
    pub fn base_addr(&self) -> u32 {
        self.ring.base_addr()
    }

    /// Bus address of the last descriptor, the initial tail pointer.
    #[must_use]
    pub fn last_addr(&self) -> u32 {
        self.ring.addr_of(N.saturating_sub(1))
    }

    /// Index of the next descriptor software will inspect.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.ring.current_index()
    }

    /// Descriptor at `index` (wrapping), for inspection.
    #[must_use]
    pub fn descriptor(&self, index: usize) -> &RxDescriptor {
        self.ring.get(index)
    }

    /// The DMA has completed the descriptor under the cursor.
    #[must_use]
    pub fn has_frame(&self) -> bool {
        !self.ring.current().is_owned()
    }

    /// Consume the descriptor under the cursor.
    ///
    /// Returns `None` while the DMA still owns it. Otherwise classifies the
    /// write-back, passes it to `f`, re-arms the descriptor with its buffer,
    /// advances the cursor and returns `f`'s result together with the tail
    /// pointer value (address of the re-armed descriptor).
    pub fn process_current<T>(&mut self, f: impl FnOnce(RxOutcome<'_>) -> T) -> Option<(T, u32)> {
        let index = self.ring.current_index();
        let status = self.ring.current().status()?;
        // Buffer contents are only valid after OWN was observed clear
        fence(Ordering::Acquire);

        let outcome = if !status.is_complete() {
            RxOutcome::Fragmented(status)
        } else if status.error || status.packet_len <= CRC_SIZE {
            RxOutcome::Errored(status)
        } else {
            let len = (status.packet_len - CRC_SIZE).min(BUF);
            RxOutcome::Frame(&self.buffers[index].as_slice()[..len])
        };
        let result = f(outcome);

        self.ring.current().arm(self.buffers[index].addr());
        self.ring.advance();
        Some((result, self.ring.addr_of(index)))
    }

    /// Buffer of the slot at `index`, for tests that emulate DMA writes.
    #[cfg(test)]
    pub fn buffer_mut(&mut self, index: usize) -> &mut [u8] {
        self.buffers[index % N].as_mut_slice()
    }
}

impl<const N: usize, const BUF: usize> Default for RxRing<N, BUF> {
    fn default() -> Self {
        Self::new()
    }
}
