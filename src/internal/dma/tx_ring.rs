//! Transmit descriptor ring with its frame buffers.

use super::buffer::DmaBuffer;
use super::descriptor::TxDescriptor;
use super::ring::DescriptorRing;
use crate::error::{DmaError, DmaResult};

/// Transmit ring: `N` descriptors, each backed by one `BUF`-byte buffer.
///
/// The ring and its buffers must live in DMA-reachable memory and stay in
/// place after [`init`](Self::init).
pub struct TxRing<const N: usize, const BUF: usize> {
    ring: DescriptorRing<TxDescriptor, N>,
    buffers: [DmaBuffer<BUF>; N],
}

impl<const N: usize, const BUF: usize> TxRing<N, BUF> {
    /// Create a ring with every descriptor owned by software.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: DescriptorRing::from_array([const { TxDescriptor::new() }; N]),
            buffers: [const { DmaBuffer::new() }; N],
        }
    }

    /// Zero every descriptor and move the cursor to slot 0.
    pub fn init(&mut self) {
        for desc in self.ring.iter() {
            desc.reset();
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

    /// Bus address of descriptor 0.
    #[must_use]
    pub fn base_addr(&self) -> u32 {
        self.ring.base_addr()
    }

    /// Index of the next slot a frame will be written to.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.ring.current_index()
    }

    /// Software owns the slot under the cursor.
    #[must_use]
    pub fn current_free(&self) -> bool {
        !self.ring.current().is_owned()
    }

    /// Descriptor at `index` (wrapping), for inspection.
    #[must_use]
    pub fn descriptor(&self, index: usize) -> &TxDescriptor {
        self.ring.get(index)
    }

    /// Number of slots currently owned by the DMA.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.ring.iter().filter(|d| d.is_owned()).count()
    }

    /// Concatenate `fragments` into the current slot's buffer.
    ///
    /// Returns the total length. Nothing is handed to the DMA yet.
    pub fn stage(&mut self, fragments: &[&[u8]]) -> DmaResult<usize> {
        if !self.current_free() {
            return Err(DmaError::DescriptorBusy);
        }

        let total: usize = fragments.iter().map(|f| f.len()).sum();
        if total == 0 {
            return Err(DmaError::InvalidLength);
        }
        if total > BUF {
            return Err(DmaError::FrameTooLarge);
        }

        let buffer = self.buffers[self.ring.current_index()].as_mut_slice();
        let mut offset = 0;
        for fragment in fragments {
            buffer[offset..offset + fragment.len()].copy_from_slice(fragment);
            offset += fragment.len();
        }
        Ok(total)
    }

    /// Hand the staged `len`-byte frame to the DMA and advance the cursor.
    ///
    /// Returns the tail pointer value (address of the new cursor slot).
    pub fn publish(&mut self, len: usize) -> DmaResult<u32> {
        let index = self.ring.current_index();
        let addr = self.buffers[index].addr();
        self.ring.current().publish(addr, len)?;
        self.ring.advance();
        Ok(self.ring.addr_of(self.ring.current_index()))
    }

    /// Stage and publish in one step.
    pub fn submit(&mut self, fragments: &[&[u8]]) -> DmaResult<(usize, u32)> {
        let len = self.stage(fragments)?;
        let tail = self.publish(len)?;
        Ok((len, tail))
    }

    /// Staged bytes of the slot at `index`, for inspection.
    #[must_use]
    pub fn buffer(&self, index: usize) -> &[u8] {
        self.buffers[index % N].as_slice()
    }
}

impl<const N: usize, const BUF: usize> Default for TxRing<N, BUF> {
    fn default() -> Self {
        Self::new()
    }
}
