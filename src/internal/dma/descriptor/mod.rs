//! TX and RX DMA descriptor structures.
//!
//! Each descriptor points to a data buffer and carries the OWN flag that
//! hands the buffer back and forth between the CPU and the DMA engine.
//! Descriptors are only mutated through methods that write the OWN word
//! last, behind a memory barrier.

pub mod bits;
pub mod rx;
pub mod tx;

pub use rx::{RxDescriptor, RxStatus};
pub use tx::TxDescriptor;

use core::sync::atomic::{Ordering, fence};

/// Who may touch a descriptor and its buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ownership {
    /// CPU owns the descriptor; the DMA engine will not access it
    Software,
    /// DMA engine owns the descriptor; software must not touch the buffer
    Hardware,
}

impl Ownership {
    /// Decode from a descriptor word carrying the OWN bit at bit 31
    #[inline(always)]
    pub const fn from_word(word: u32) -> Self {
        if word & bits::tdes3::OWN != 0 {
            Self::Hardware
        } else {
            Self::Software
        }
    }
}

/// Order all prior descriptor/buffer writes before the next write.
///
/// Placed before the OWN hand-over and before poking the DMA tail pointer.
#[inline(always)]
pub(crate) fn publish_barrier() {
    fence(Ordering::SeqCst);
}

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: VolatileCell is safe to share between threads because all access
// is through volatile operations which are single-copy atomic for u32 on
// Cortex-M.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_decodes_bit_31() {
        assert_eq!(Ownership::from_word(0), Ownership::Software);
        assert_eq!(Ownership::from_word(0x7FFF_FFFF), Ownership::Software);
        assert_eq!(Ownership::from_word(0x8000_0000), Ownership::Hardware);
    }

    #[test]
    fn volatile_cell_get_set() {
        let cell = VolatileCell::new(5u32);
        assert_eq!(cell.get(), 5);
        cell.set(0xDEAD_BEEF);
        assert_eq!(cell.get(), 0xDEAD_BEEF);
    }
}
