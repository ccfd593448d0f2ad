//! Configuration types for the network interface

use crate::error::{ConfigError, ConfigResult};
use crate::hal::mdio::{MAX_PHY_ADDR, MdcClockDivider};
use crate::internal::constants::{
    BLOCK_TIMEOUT_MS, CRC_SIZE, DEFAULT_MAC_ADDR, DEFAULT_PHY_ADDR, ETH_HEADER_SIZE, MTU,
    SOFT_RESET_TIMEOUT_MS,
};
use crate::sys::Timeout;

/// Smallest MTU accepted by [`NetifConfig::validate`] (minimum Ethernet payload)
pub const MIN_MTU: u16 = 46;

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    #[default]
    Full,
}

/// Network interface configuration
///
/// Built with the `with_*` methods; every field has a default matching the
/// board the port was written for (LAN8740 at MDIO address 1, 100 Mbps full
/// duplex, PAUSE flow control on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetifConfig {
    /// Station MAC address
    pub mac_address: [u8; 6],
    /// Largest IP packet the interface carries
    pub mtu: u16,
    /// PHY address on the MDIO bus
    pub phy_addr: u8,
    /// MDC clock divider for the current HCLK
    pub mdc_divider: MdcClockDivider,
    /// MAC speed programmed at bring-up
    pub speed: Speed,
    /// MAC duplex programmed at bring-up
    pub duplex: Duplex,
    /// Enable PAUSE frame transmission and reception
    pub flow_control: bool,
    /// Bound on the DMA software reset
    pub sw_reset_timeout_ms: u32,
    /// Bound on acquiring the transmit lock
    pub tx_lock_timeout_ms: u32,
    /// Bound on waiting for the DMA to release the next TX slot
    ///
    /// Applies twice per frame: before submission, when the cursor slot is
    /// still owned by the DMA, and after the tail pointer kick.
    pub tx_reclaim_timeout_ms: u32,
}

impl Default for NetifConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NetifConfig {
    /// Create a configuration with default values
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            mtu: MTU as u16,
            phy_addr: DEFAULT_PHY_ADDR,
            mdc_divider: MdcClockDivider::Div124,
            speed: Speed::Mbps100,
            duplex: Duplex::Full,
            flow_control: true,
            sw_reset_timeout_ms: SOFT_RESET_TIMEOUT_MS,
            tx_lock_timeout_ms: BLOCK_TIMEOUT_MS,
            tx_reclaim_timeout_ms: BLOCK_TIMEOUT_MS,
        }
    }

    /// Set the MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, mac: [u8; 6]) -> Self {
        self.mac_address = mac;
        self
    }

    /// Set the MTU
    #[must_use]
    pub const fn with_mtu(mut self, mtu: u16) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the PHY address
    #[must_use]
    pub const fn with_phy_addr(mut self, addr: u8) -> Self {
        self.phy_addr = addr;
        self
    }

    /// Set the MDC clock divider
    #[must_use]
    pub const fn with_mdc_divider(mut self, divider: MdcClockDivider) -> Self {
        self.mdc_divider = divider;
        self
    }

    /// Set the link speed
    #[must_use]
    pub const fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the duplex mode
    #[must_use]
    pub const fn with_duplex(mut self, duplex: Duplex) -> Self {
        self.duplex = duplex;
        self
    }

    /// Enable or disable PAUSE flow control
    #[must_use]
    pub const fn with_flow_control(mut self, enabled: bool) -> Self {
        self.flow_control = enabled;
        self
    }

    /// Set the DMA software reset timeout
    #[must_use]
    pub const fn with_sw_reset_timeout_ms(mut self, ms: u32) -> Self {
        self.sw_reset_timeout_ms = ms;
        self
    }

    /// Set the transmit lock timeout (0 waits forever)
    #[must_use]
    pub const fn with_tx_lock_timeout_ms(mut self, ms: u32) -> Self {
        self.tx_lock_timeout_ms = ms;
        self
    }

    /// Set the transmit slot reclaim timeout (0 waits forever)
    ///
    /// Also bounds the wait for the cursor slot before a frame is submitted;
    /// expiry there fails the send with `DescriptorBusy`.
    #[must_use]
    pub const fn with_tx_reclaim_timeout_ms(mut self, ms: u32) -> Self {
        self.tx_reclaim_timeout_ms = ms;
        self
    }

    /// Transmit lock bound as a [`Timeout`]
    pub const fn tx_lock_timeout(&self) -> Timeout {
        Timeout::from_millis(self.tx_lock_timeout_ms)
    }

    /// Transmit reclaim bound as a [`Timeout`]
    pub const fn tx_reclaim_timeout(&self) -> Timeout {
        Timeout::from_millis(self.tx_reclaim_timeout_ms)
    }

    /// Largest frame on the wire, including header and CRC
    pub const fn max_frame_len(&self) -> usize {
        self.mtu as usize + ETH_HEADER_SIZE + CRC_SIZE
    }

    /// Check the configuration against DMA buffers of `buffer_size` bytes
    pub fn validate(&self, buffer_size: usize) -> ConfigResult<()> {
        if self.phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress);
        }
        // Group bit set: not a station address
        if self.mac_address[0] & 0x01 != 0 {
            return Err(ConfigError::InvalidConfig);
        }
        if self.mtu < MIN_MTU || self.max_frame_len() > buffer_size {
            return Err(ConfigError::InvalidConfig);
        }
        if self.sw_reset_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}
