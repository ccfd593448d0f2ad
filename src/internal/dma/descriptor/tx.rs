//! TX DMA descriptor for frame transmission.

use super::bits::{tdes2, tdes3};
use super::{Ownership, VolatileCell, publish_barrier};
use crate::error::{DmaError, DmaResult};

/// TX DMA descriptor (16 bytes, normal descriptor format).
///
/// Each descriptor carries exactly one buffer holding a complete frame, so
/// both FD and LD are set on every hand-over.
#[repr(C, align(16))]
pub struct TxDescriptor {
    /// TDES0: Buffer 1 address
    tdes0: VolatileCell<u32>,
    /// TDES1: Buffer 2 address (unused)
    tdes1: VolatileCell<u32>,
    /// TDES2: Buffer length and IOC
    tdes2: VolatileCell<u32>,
    /// TDES3: Control/status and OWN
    tdes3: VolatileCell<u32>,
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed TX descriptor, owned by software.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tdes0: VolatileCell::new(0),
            tdes1: VolatileCell::new(0),
            tdes2: VolatileCell::new(0),
            tdes3: VolatileCell::new(0),
        }
    }

    /// Zero all words, returning the descriptor to software.
    pub fn reset(&self) {
        self.tdes3.set(0);
        self.tdes2.set(0);
        self.tdes1.set(0);
        self.tdes0.set(0);
    }

    /// Current owner of the descriptor.
    #[inline(always)]
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        Ownership::from_word(self.tdes3.get())
    }

    /// Check if descriptor is owned by DMA.
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.ownership() == Ownership::Hardware
    }

    /// Hand a single-buffer frame of `len` bytes at `buffer_addr` to the DMA.
    ///
    /// Address and length words are written first; OWN is set last, after a
    /// barrier, so the engine never sees a half-built descriptor.
    pub fn publish(&self, buffer_addr: u32, len: usize) -> DmaResult<()> {
        if self.is_owned() {
            return Err(DmaError::DescriptorBusy);
        }
        if len == 0 {
            return Err(DmaError::InvalidLength);
        }
        if len > tdes2::B1L_MASK as usize {
            return Err(DmaError::FrameTooLarge);
        }

        let len = len as u32;
        self.tdes0.set(buffer_addr);
        self.tdes1.set(0);
        self.tdes2.set(tdes2::IOC | (len & tdes2::B1L_MASK));
        publish_barrier();
        self.tdes3
            .set(tdes3::OWN | tdes3::FD | tdes3::LD | (len & tdes3::FL_MASK));
        Ok(())
    }

    /// Buffer address programmed into TDES0.
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.tdes0.get()
    }

    /// Frame length programmed into TDES3.
    #[inline(always)]
    #[must_use]
    pub fn frame_len(&self) -> usize {
        (self.tdes3.get() & tdes3::FL_MASK) as usize
    }

    /// Check if the completed transmission reported an error.
    #[inline(always)]
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.is_owned() && (self.tdes3.get() & tdes3::ES) != 0
    }

    /// Raw descriptor words, for diagnostics.
    #[must_use]
    pub fn raw(&self) -> [u32; 4] {
        [
            self.tdes0.get(),
            self.tdes1.get(),
            self.tdes2.get(),
            self.tdes3.get(),
        ]
    }

    /// Emulate DMA write-back: clear OWN, keep FD/LD.
    #[cfg(test)]
    pub fn simulate_complete(&self) {
        self.tdes3.set(self.tdes3.get() & (tdes3::FD | tdes3::LD));
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}
