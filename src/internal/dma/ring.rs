//! Generic circular ring of DMA descriptors.

/// Circular descriptor ring with wraparound index.
///
/// Owns the descriptor array; the DMA engine is pointed at [`base_addr`]
/// so the ring must not move once that address has been programmed.
///
/// [`base_addr`]: DescriptorRing::base_addr
pub struct DescriptorRing<D, const N: usize> {
    /// Array of descriptors
    pub(super) descriptors: [D; N],
    /// Cursor: next descriptor software will use
    pub(super) current: usize,
}

impl<D, const N: usize> DescriptorRing<D, N> {
    /// Create a new descriptor ring from an existing array
    #[must_use]
    pub const fn from_array(descriptors: [D; N]) -> Self {
        Self {
            descriptors,
            current: 0,
        }
    }

    /// Get the number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring is empty (only for a zero-sized ring)
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Get the current index
    #[inline(always)]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Advance the cursor by one, wrapping around
    #[inline(always)]
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % N;
    }

    /// Move the cursor back to slot 0
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Descriptor under the cursor
    #[inline(always)]
    pub fn current(&self) -> &D {
        &self.descriptors[self.current]
    }

    /// Descriptor at a specific index (wrapping)
    #[inline(always)]
    pub fn get(&self, index: usize) -> &D {
        &self.descriptors[index % N]
    }

    /// Descriptor at an offset from the cursor (wrapping)
    #[inline(always)]
    pub fn at_offset(&self, offset: usize) -> &D {
        &self.descriptors[(self.current + offset) % N]
    }

    /// Bus address of the first descriptor, for the list address register
    #[inline(always)]
    pub fn base_addr(&self) -> u32 {
        self.descriptors.as_ptr() as usize as u32
    }

    /// Bus address of the descriptor at `index` (wrapping), for tail pointers
    #[inline(always)]
    pub fn addr_of(&self, index: usize) -> u32 {
        self.get(index) as *const D as usize as u32
    }

    /// Iterate over all descriptors
    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.descriptors.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
