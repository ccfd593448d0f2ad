//! LAN8740 PHY Driver
//!
//! Microchip LAN8740A/LAN8740Ai 10/100 Ethernet PHY, wired over MII on the
//! target board at MDIO address 1.
//!
//! Bring-up: soft reset, advertise 100BASE-TX half/full duplex plus both
//! pause bits, enable and restart auto-negotiation, then unmask the
//! "auto-negotiation complete" and "link down" interrupt sources.

use log::{debug, info};

use super::generic::{LinkStatus, PhyDriver, ieee802_3};
use crate::driver::config::{Duplex, Speed};
use crate::driver::netif::LinkState;
use crate::error::{ConfigError, Result};
use crate::hal::mdio::{MAX_PHY_ADDR, MdioBus};
use crate::internal::constants::PHY_RESET_ATTEMPTS;
use crate::internal::phy_regs::lan8740::{int, phy_id, pscsr, reg};
use crate::internal::phy_regs::standard::{anar, bmsr, phy_reg};

/// LAN8740 PHY identifier (revision bits masked)
pub const LAN8740_PHY_ID: u32 = phy_id::ID;

/// Mask applied before comparing against [`LAN8740_PHY_ID`]
pub const LAN8740_PHY_ID_MASK: u32 = phy_id::MASK;

/// Advertisement written during init: 100BASE-TX HD/FD, symmetric and asymmetric pause
pub const DEFAULT_ADVERTISEMENT: u16 =
    anar::TX_HD | anar::TX_FD | anar::PAUSE | anar::PAUSE_ASYM | anar::SELECTOR_IEEE802_3;

/// Interrupt sources unmasked during init
pub const DEFAULT_INTERRUPT_MASK: u16 = int::AN_COMPLETE | int::LINK_DOWN;

/// LAN8740 PHY driver
#[derive(Debug)]
pub struct Lan8740 {
    addr: u8,
    advertisement: u16,
    last_link_up: bool,
    last_an_complete: bool,
}

impl Lan8740 {
    /// Create a driver for the PHY at `addr` with the default advertisement
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self {
            addr,
            advertisement: DEFAULT_ADVERTISEMENT,
            last_link_up: false,
            last_an_complete: false,
        }
    }

    /// Advertise pause capability only if `enabled`
    #[must_use]
    pub const fn with_pause(mut self, enabled: bool) -> Self {
        if enabled {
            self.advertisement |= anar::PAUSE | anar::PAUSE_ASYM;
        } else {
            self.advertisement &= !(anar::PAUSE | anar::PAUSE_ASYM);
        }
        self
    }

    /// Advertisement value written to ANAR by [`init`](PhyDriver::init)
    #[must_use]
    pub const fn advertisement(&self) -> u16 {
        self.advertisement
    }

    /// Check that the PHY at our address reports the LAN8740 identifier
    pub fn verify_id<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        let id = ieee802_3::read_phy_id(mdio, self.addr)?;
        Ok((id & LAN8740_PHY_ID_MASK) == LAN8740_PHY_ID)
    }

    /// Read and clear the interrupt source flags
    pub fn read_interrupt_status<M: MdioBus>(&self, mdio: &mut M) -> Result<u16> {
        mdio.read(self.addr, reg::ISFR)
    }

    /// Set which interrupt sources drive the nINT pin
    pub fn set_interrupt_mask<M: MdioBus>(&self, mdio: &mut M, mask: u16) -> Result<()> {
        mdio.write(self.addr, reg::IMR, mask)
    }

    /// Resolved speed/duplex from the special control/status register
    pub fn read_speed_indication<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        let value = mdio.read(self.addr, reg::PSCSR)?;
        if value & pscsr::AUTODONE == 0 {
            return Ok(None);
        }
        let status = match value & pscsr::SPEED_MASK {
            pscsr::SPEED_10_HD => LinkStatus::new(Speed::Mbps10, Duplex::Half),
            pscsr::SPEED_10_FD => LinkStatus::new(Speed::Mbps10, Duplex::Full),
            pscsr::SPEED_100_HD => LinkStatus::new(Speed::Mbps100, Duplex::Half),
            pscsr::SPEED_100_FD => LinkStatus::new(Speed::Mbps100, Duplex::Full),
            _ => return Ok(None),
        };
        Ok(Some(status))
    }

    /// Poll BSR, log transitions and publish link changes to `link`.
    ///
    /// Returns `Some(up)` when the link state changed since the last poll.
    pub fn update_link<M: MdioBus>(&mut self, mdio: &mut M, link: &LinkState) -> Result<Option<bool>> {
        let status = mdio.read(self.addr, phy_reg::BMSR)?;

        let an_complete = status & bmsr::AN_COMPLETE != 0;
        if an_complete != self.last_an_complete {
            if an_complete {
                info!("phy: auto-negotiation complete");
            } else {
                debug!("phy: auto-negotiation not complete");
            }
            self.last_an_complete = an_complete;
        }

        let link_up = status & bmsr::LINK_STATUS != 0;
        if link_up == self.last_link_up {
            return Ok(None);
        }
        if link_up {
            info!("phy: link is up");
        } else {
            info!("phy: link is down");
        }
        self.last_link_up = link_up;
        link.set(link_up);
        Ok(Some(link_up))
    }
}

impl PhyDriver for Lan8740 {
    fn address(&self) -> u8 {
        self.addr
    }

    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        if self.addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }

        self.soft_reset(mdio)?;
        mdio.write(self.addr, phy_reg::ANAR, self.advertisement)?;
        ieee802_3::restart_auto_negotiation(mdio, self.addr)?;
        self.set_interrupt_mask(mdio, DEFAULT_INTERRUPT_MASK)?;

        self.last_link_up = false;
        self.last_an_complete = false;
        debug!("phy: LAN8740 at {} initialized", self.addr);
        Ok(())
    }

    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        ieee802_3::soft_reset(mdio, self.addr, PHY_RESET_ATTEMPTS)
    }

    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        ieee802_3::is_link_up(mdio, self.addr)
    }

    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        if !self.is_link_up(mdio)? {
            return Ok(None);
        }
        self.read_speed_indication(mdio)
    }

    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        let link_up = self.is_link_up(mdio)?;
        let came_up = link_up && !self.last_link_up;
        self.last_link_up = link_up;
        if came_up {
            return self.read_speed_indication(mdio);
        }
        Ok(None)
    }

    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<u32> {
        ieee802_3::read_phy_id(mdio, self.addr)
    }

    fn is_auto_negotiation_complete<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        ieee802_3::is_an_complete(mdio, self.addr)
    }
}
