//! MDIO (Management Data Input/Output) HAL
//!
//! Register-indirect access to the PHY through the MAC's MDIO address and
//! data registers: program PHY/register address and opcode, set the busy
//! bit, poll until hardware clears it, then read or write the 16-bit data
//! register.

use embedded_hal::delay::DelayNs;

use crate::error::{ConfigError, IoError, Result};
use crate::internal::register::EthRegisters;
use crate::internal::register::mac::{
    MACMDIOAR_CR_MASK, MACMDIOAR_CR_SHIFT, MACMDIOAR_GOC_READ, MACMDIOAR_GOC_WRITE, MACMDIOAR_MB,
    MACMDIOAR_PA_MASK, MACMDIOAR_PA_SHIFT, MACMDIOAR_RDA_MASK, MACMDIOAR_RDA_SHIFT,
    MACMDIODR_MD_MASK, MacRegs,
};

// =============================================================================
// MDIO Constants
// =============================================================================

/// Default MDIO operation timeout in microseconds
pub const MDIO_TIMEOUT_US: u32 = 1_000;

/// Busy-bit poll step in microseconds
const MDIO_POLL_STEP_US: u32 = 10;

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

/// MDC clock divider (MACMDIOAR.CR) for the AHB clock feeding the MAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MdcClockDivider {
    /// HCLK/42 (60-100 MHz)
    Div42 = 0,
    /// HCLK/62 (100-150 MHz)
    Div62 = 1,
    /// HCLK/16 (20-35 MHz)
    Div16 = 2,
    /// HCLK/26 (35-60 MHz)
    Div26 = 3,
    /// HCLK/102 (150-250 MHz)
    Div102 = 4,
    /// HCLK/124 (250-300 MHz)
    #[default]
    Div124 = 5,
}

impl MdcClockDivider {
    /// Get the appropriate divider for a given AHB clock frequency
    ///
    /// The MDC clock must not exceed 2.5 MHz per IEEE 802.3.
    pub const fn from_hclk_hz(hclk_hz: u32) -> Self {
        if hclk_hz < 35_000_000 {
            Self::Div16
        } else if hclk_hz < 60_000_000 {
            Self::Div26
        } else if hclk_hz < 100_000_000 {
            Self::Div42
        } else if hclk_hz < 150_000_000 {
            Self::Div62
        } else if hclk_hz < 250_000_000 {
            Self::Div102
        } else {
            Self::Div124
        }
    }

    /// Get the divider value for register programming
    pub const fn to_reg_value(self) -> u32 {
        self as u32
    }
}

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// PHY drivers only talk to this trait, so they run unchanged against the
/// hardware controller and the test mock.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Check if the MDIO bus is busy
    fn is_busy(&self) -> bool;
}

// =============================================================================
// MDIO Controller
// =============================================================================

/// MDIO controller driving MACMDIOAR/MACMDIODR
pub struct MdioController<R: EthRegisters, D: DelayNs> {
    mac: MacRegs<R>,
    /// Clock divider setting
    clock_divider: MdcClockDivider,
    /// Delay provider for timeout handling
    delay: D,
    /// Operation timeout in microseconds
    timeout_us: u32,
}

impl<R: EthRegisters, D: DelayNs> MdioController<R, D> {
    /// Create a new MDIO controller with the default divider
    pub fn new(regs: R, delay: D) -> Self {
        Self::with_clock_divider(regs, delay, MdcClockDivider::default())
    }

    /// Create a new MDIO controller with a custom clock divider
    pub fn with_clock_divider(regs: R, delay: D, divider: MdcClockDivider) -> Self {
        Self {
            mac: MacRegs::new(regs),
            clock_divider: divider,
            delay,
            timeout_us: MDIO_TIMEOUT_US,
        }
    }

    /// Program the clock divider into MACMDIOAR.CR.
    ///
    /// Done once during bring-up, before the first PHY access.
    pub fn apply_clock_divider(&self) {
        let cr = (self.clock_divider.to_reg_value() << MACMDIOAR_CR_SHIFT) & MACMDIOAR_CR_MASK;
        self.mac.set_mdio_address(cr);
    }

    /// Current clock divider
    pub fn clock_divider(&self) -> MdcClockDivider {
        self.clock_divider
    }

    /// Set the operation timeout
    pub fn set_timeout_us(&mut self, timeout_us: u32) {
        self.timeout_us = timeout_us;
    }

    /// Wait for MDIO operation to complete
    fn wait_not_busy(&mut self) -> Result<()> {
        let mut elapsed = 0u32;
        while self.mac.mdio_busy() {
            if elapsed >= self.timeout_us {
                return Err(IoError::PhyError.into());
            }
            self.delay.delay_us(MDIO_POLL_STEP_US);
            elapsed += MDIO_POLL_STEP_US;
        }
        Ok(())
    }

    /// Build the MACMDIOAR value that starts an operation
    fn build_mdio_addr(&self, phy_addr: u8, reg_addr: u8, opcode: u32) -> u32 {
        (((phy_addr as u32) << MACMDIOAR_PA_SHIFT) & MACMDIOAR_PA_MASK)
            | (((reg_addr as u32) << MACMDIOAR_RDA_SHIFT) & MACMDIOAR_RDA_MASK)
            | ((self.clock_divider.to_reg_value() << MACMDIOAR_CR_SHIFT) & MACMDIOAR_CR_MASK)
            | opcode
            | MACMDIOAR_MB
    }

    fn validate(phy_addr: u8, reg_addr: u8) -> Result<()> {
        if phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        if reg_addr > MAX_REG_ADDR {
            return Err(ConfigError::InvalidConfig.into());
        }
        Ok(())
    }
}

impl<R: EthRegisters, D: DelayNs> MdioBus for MdioController<R, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Self::validate(phy_addr, reg_addr)?;
        self.wait_not_busy()?;

        let addr = self.build_mdio_addr(phy_addr, reg_addr, MACMDIOAR_GOC_READ);
        self.mac.set_mdio_address(addr);
        self.wait_not_busy()?;

        Ok((self.mac.mdio_data() & MACMDIODR_MD_MASK) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        Self::validate(phy_addr, reg_addr)?;
        self.wait_not_busy()?;

        // Data first; setting MB in the address register starts the transfer
        self.mac.set_mdio_data(value as u32 & MACMDIODR_MD_MASK);
        let addr = self.build_mdio_addr(phy_addr, reg_addr, MACMDIOAR_GOC_WRITE);
        self.mac.set_mdio_address(addr);

        self.wait_not_busy()
    }

    fn is_busy(&self) -> bool {
        self.mac.mdio_busy()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::internal::register::mac::{MACMDIOAR_GOC_MASK, MACMDIOAR_OFFSET, MACMDIODR_OFFSET};
    use crate::testing::{MockDelay, MockRegisters};

    // =========================================================================
    // Clock Divider Tests
    // =========================================================================

    #[test]
    fn clock_divider_from_hclk() {
        assert_eq!(MdcClockDivider::from_hclk_hz(20_000_000), MdcClockDivider::Div16);
        assert_eq!(MdcClockDivider::from_hclk_hz(40_000_000), MdcClockDivider::Div26);
        assert_eq!(MdcClockDivider::from_hclk_hz(80_000_000), MdcClockDivider::Div42);
        assert_eq!(MdcClockDivider::from_hclk_hz(120_000_000), MdcClockDivider::Div62);
        assert_eq!(MdcClockDivider::from_hclk_hz(200_000_000), MdcClockDivider::Div102);
        assert_eq!(MdcClockDivider::from_hclk_hz(240_000_000), MdcClockDivider::Div102);
        assert_eq!(MdcClockDivider::from_hclk_hz(280_000_000), MdcClockDivider::Div124);
    }

    #[test]
    fn clock_divider_reg_values() {
        assert_eq!(MdcClockDivider::Div42.to_reg_value(), 0);
        assert_eq!(MdcClockDivider::Div124.to_reg_value(), 5);
        assert_eq!(MdcClockDivider::default(), MdcClockDivider::Div124);
    }

    // =========================================================================
    // Controller Tests
    // =========================================================================

    #[test]
    fn read_programs_address_and_returns_data() {
        let regs = MockRegisters::new();
        regs.set_mdio_read_data(0xC111);
        let mut mdio = MdioController::new(&regs, MockDelay::new());

        assert_eq!(mdio.read(1, 3).unwrap(), 0xC111);

        let addr = regs.last_write(MACMDIOAR_OFFSET).unwrap();
        assert_eq!((addr & MACMDIOAR_PA_MASK) >> MACMDIOAR_PA_SHIFT, 1);
        assert_eq!((addr & MACMDIOAR_RDA_MASK) >> MACMDIOAR_RDA_SHIFT, 3);
        assert_eq!((addr & MACMDIOAR_CR_MASK) >> MACMDIOAR_CR_SHIFT, 5);
        assert_eq!(addr & MACMDIOAR_GOC_MASK, MACMDIOAR_GOC_READ);
        assert_ne!(addr & MACMDIOAR_MB, 0);
        // Busy bit cleared by the (emulated) hardware
        assert!(!mdio.is_busy());
    }

    #[test]
    fn write_uses_write_opcode_and_data_register() {
        let regs = MockRegisters::new();
        let mut mdio = MdioController::new(&regs, MockDelay::new());

        mdio.write(1, 4, 0x0D81).unwrap();

        assert_eq!(regs.last_write(MACMDIODR_OFFSET), Some(0x0D81));
        let addr = regs.last_write(MACMDIOAR_OFFSET).unwrap();
        assert_eq!(addr & MACMDIOAR_GOC_MASK, MACMDIOAR_GOC_WRITE);
        assert_eq!((addr & MACMDIOAR_RDA_MASK) >> MACMDIOAR_RDA_SHIFT, 4);
    }

    #[test]
    fn invalid_addresses_rejected() {
        let regs = MockRegisters::new();
        let mut mdio = MdioController::new(&regs, MockDelay::new());

        assert_eq!(mdio.read(32, 0), Err(Error::Config(ConfigError::InvalidPhyAddress)));
        assert_eq!(mdio.write(0, 32, 0), Err(Error::Config(ConfigError::InvalidConfig)));
        assert_eq!(regs.write_count(MACMDIOAR_OFFSET), 0);
    }

    #[test]
    fn stuck_busy_bit_times_out() {
        let regs = MockRegisters::new();
        regs.set_mdio_stuck(true);
        let delay = MockDelay::new();
        let mut mdio = MdioController::new(&regs, &delay);

        assert_eq!(mdio.read(1, 1), Err(Error::Io(IoError::PhyError)));
        assert!(delay.total_ns() >= u64::from(MDIO_TIMEOUT_US) * 1_000);
    }

    #[test]
    fn apply_clock_divider_sets_cr_field() {
        let regs = MockRegisters::new();
        let mdio = MdioController::with_clock_divider(&regs, MockDelay::new(), MdcClockDivider::Div102);
        mdio.apply_clock_divider();
        assert_eq!(regs.read(MACMDIOAR_OFFSET), 4 << MACMDIOAR_CR_SHIFT);
    }
}
