//! Memory-mapped register definitions for the STM32H7 Ethernet peripheral
//!
//! The MAC, MTL and DMA blocks share one 4 KiB-aligned window. All accesses
//! go through [`EthRegisters`], which takes an offset from the window base;
//! [`EthMmio`] performs the volatile accesses on hardware and host tests
//! substitute a recording mock.

pub mod dma;
pub mod mac;

/// Ethernet peripheral base address (AHB1, STM32H74x/H75x)
pub const ETH_BASE: usize = 0x4002_8000;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

// =============================================================================
// Register Block Access
// =============================================================================

/// Word access to the Ethernet register window.
///
/// Offsets are byte offsets from the peripheral base.
pub trait EthRegisters {
    /// Read the register at `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write the register at `offset`
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write the register at `offset`
    #[inline(always)]
    fn modify<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set bits (read-modify-write)
    #[inline(always)]
    fn set_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v | bits);
    }

    /// Clear bits (read-modify-write)
    #[inline(always)]
    fn clear_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v & !bits);
    }
}

impl<T: EthRegisters + ?Sized> EthRegisters for &T {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Volatile access to the real peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthMmio {
    base: usize,
}

impl EthMmio {
    /// The Ethernet peripheral of STM32H74x/H75x devices
    pub const fn stm32h7() -> Self {
        Self { base: ETH_BASE }
    }

    /// Register window at a custom base address
    ///
    /// # Safety
    /// `base` must be the base of a mapped Ethernet QoS register block.
    pub const unsafe fn at(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the register window
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl EthRegisters for EthMmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: base is a valid peripheral window and offsets are word aligned
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: base is a valid peripheral window and offsets are word aligned
        unsafe { write_reg(self.base + offset, value) }
    }
}

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a register.
///
/// # Example
/// ```ignore
/// impl<R: EthRegisters> DmaRegs<R> {
///     reg_rw!(mode, set_mode, DMAMR_OFFSET, "DMA Mode register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.regs.read($offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&self, value: u32) {
            self.regs.write($offset, value)
        }
    };
}

/// Generate set/clear bit operation methods for a register.
///
/// # Example
/// ```ignore
/// impl<R: EthRegisters> DmaRegs<R> {
///     reg_bit_ops!(start_tx, stop_tx, DMACTCR_OFFSET, DMACTCR_ST,
///                  "TX DMA", "Start", "Stop");
/// }
/// ```
macro_rules! reg_bit_ops {
    ($set_fn:ident, $clear_fn:ident, $offset:expr, $bit:expr, $what:expr, $set_verb:expr, $clear_verb:expr) => {
        #[doc = concat!($set_verb, " ", $what)]
        #[inline(always)]
        pub fn $set_fn(&self) {
            self.regs.set_bits($offset, $bit)
        }

        #[doc = concat!($clear_verb, " ", $what)]
        #[inline(always)]
        pub fn $clear_fn(&self) {
            self.regs.clear_bits($offset, $bit)
        }
    };
}

// Export macros for use in submodules
pub(crate) use reg_bit_ops;
pub(crate) use reg_rw;
