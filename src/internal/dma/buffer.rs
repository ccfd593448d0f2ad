//! Word-aligned frame buffers handed to the DMA engine.

/// One DMA frame buffer of `BUF` bytes, 4-byte aligned.
#[repr(C, align(4))]
pub struct DmaBuffer<const BUF: usize> {
    bytes: [u8; BUF],
}

impl<const BUF: usize> DmaBuffer<BUF> {
    /// Compile-time check: the DMA transfers whole words.
    const VALID_SIZE: () = assert!(BUF > 0 && BUF % 4 == 0, "DMA buffer size must be a non-zero multiple of 4");

    /// Create a zeroed buffer.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::VALID_SIZE;
        Self { bytes: [0; BUF] }
    }

    /// Capacity in bytes.
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        BUF
    }

    /// Bus address of the first byte.
    #[inline(always)]
    #[must_use]
    pub fn addr(&self) -> u32 {
        self.bytes.as_ptr() as usize as u32
    }

    /// Buffer contents.
    #[inline(always)]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable buffer contents.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl<const BUF: usize> Default for DmaBuffer<BUF> {
    fn default() -> Self {
        Self::new()
    }
}
