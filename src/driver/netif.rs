//! Network interface bring-up and shared interface state.
//!
//! [`init`] takes the MAC/DMA from reset to running:
//!
//! 1. DMA software reset, bounded by the configured timeout
//! 2. MDC clock divider, then PHY bring-up over MDIO
//! 3. MAC speed/duplex, transmitter/receiver enable, station address
//! 4. optional PAUSE flow control in both directions
//! 5. address-aligned bus beats
//! 6. descriptor rings: list addresses, ring lengths, RX buffer size,
//!    tail pointers
//! 7. start the TX and RX DMA
//! 8. mask MAC interrupts, enable the DMA normal + receive interrupts
//!
//! The result is split into the pieces the rest of the system owns: the
//! shared [`Transmitter`], the RX ring for the receive worker, the MDIO
//! controller for link polling and the [`InterfaceInfo`] for the stack.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use super::config::{Duplex, NetifConfig, Speed};
use super::stack::NetStack;
use super::transmit::Transmitter;
use crate::error::{ConfigError, Result};
use crate::hal::mdio::MdioController;
use crate::internal::constants::{
    ARP_TMR_INTERVAL_MS, DEFAULT_BUFFER_SIZE, DEFAULT_RING_LEN, MAC_ADDR_LEN,
};
use crate::internal::dma::{RxRing, TxRing};
use crate::internal::register::EthRegisters;
use crate::internal::register::dma::{DMACIER_NIE, DMACIER_RIE, DmaRegs};
use crate::internal::register::mac::MacRegs;
use crate::phy::PhyDriver;
use crate::sys::{PeriodicTimer, Port, Timeout, wait_for};

// =============================================================================
// DMA Storage
// =============================================================================

/// Descriptor rings and frame buffers for one interface.
///
/// Place it in DMA-reachable RAM (on STM32H7 not DTCM) with a `static`.
pub struct EthDma<const N: usize, const BUF: usize> {
    tx: TxRing<N, BUF>,
    rx: RxRing<N, BUF>,
}

/// Eight descriptors per direction, 1532-byte buffers
pub type EthDmaDefault = EthDma<DEFAULT_RING_LEN, DEFAULT_BUFFER_SIZE>;

impl<const N: usize, const BUF: usize> EthDma<N, BUF> {
    /// Create idle rings
    pub const fn new() -> Self {
        Self {
            tx: TxRing::new(),
            rx: RxRing::new(),
        }
    }

    /// Total bytes of DMA memory
    pub const fn memory_usage() -> usize {
        core::mem::size_of::<Self>()
    }
}

impl<const N: usize, const BUF: usize> Default for EthDma<N, BUF> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Link State
// =============================================================================

/// Link flag shared between the PHY poller and the RX worker.
#[derive(Debug, Default)]
pub struct LinkState {
    up: AtomicBool,
}

impl LinkState {
    /// Link initially down
    pub const fn new() -> Self {
        Self {
            up: AtomicBool::new(false),
        }
    }

    /// Record the PHY link state, returning the previous one
    pub fn set(&self, up: bool) -> bool {
        self.up.swap(up, Ordering::AcqRel)
    }

    /// Last link state reported by the PHY
    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }
}

// =============================================================================
// Interface Description
// =============================================================================

/// Interface capability flags handed to the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetifFlags(u8);

impl NetifFlags {
    /// Interface is broadcast capable
    pub const BROADCAST: Self = Self(1 << 1);
    /// Interface uses ARP
    pub const ETHARP: Self = Self(1 << 3);

    /// Raw flag bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for NetifFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// What the stack needs to know about the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceInfo {
    /// Station MAC address
    pub hwaddr: [u8; 6],
    /// Length of `hwaddr`
    pub hwaddr_len: u8,
    /// Maximum transfer unit
    pub mtu: u16,
    /// Capability flags
    pub flags: NetifFlags,
}

impl InterfaceInfo {
    /// Describe an Ethernet interface built from `config`
    pub const fn from_config(config: &NetifConfig) -> Self {
        Self {
            hwaddr: config.mac_address,
            hwaddr_len: MAC_ADDR_LEN as u8,
            mtu: config.mtu,
            flags: NetifFlags(NetifFlags::BROADCAST.0 | NetifFlags::ETHARP.0),
        }
    }
}

// =============================================================================
// Bring-up
// =============================================================================

/// Everything [`init`] hands back.
pub struct NetifParts<'a, R: EthRegisters, P, D: DelayNs, const N: usize, const BUF: usize> {
    /// Interface description for the stack
    pub info: InterfaceInfo,
    /// Shared transmit path
    pub tx: Transmitter<'a, R, P, N, BUF>,
    /// Receive ring, for the RX worker
    pub rx: &'a mut RxRing<N, BUF>,
    /// MDIO access for PHY status polling
    pub mdio: MdioController<R, D>,
}

/// Bring the MAC, DMA and PHY up and start both DMA directions.
pub fn init<'a, R, P, D, Y, const N: usize, const BUF: usize>(
    regs: R,
    port: P,
    delay: D,
    phy: &mut Y,
    dma: &'a mut EthDma<N, BUF>,
    config: &NetifConfig,
) -> Result<NetifParts<'a, R, P, D, N, BUF>>
where
    R: EthRegisters + Clone,
    P: Port,
    D: DelayNs,
    Y: PhyDriver,
{
    config.validate(BUF)?;

    let dma_regs = DmaRegs::new(regs.clone());
    let mac = MacRegs::new(regs.clone());

    dma_regs.request_reset();
    let reset_timeout = Timeout::Millis(config.sw_reset_timeout_ms);
    wait_for(&port, reset_timeout, || (!dma_regs.reset_in_progress()).then_some(()))
        .map_err(|_| ConfigError::ResetFailed)?;
    debug!("netif: DMA reset complete");

    let mut mdio = MdioController::with_clock_divider(regs.clone(), delay, config.mdc_divider);
    mdio.apply_clock_divider();
    phy.init(&mut mdio)?;

    mac.set_speed_duplex(config.speed == Speed::Mbps100, config.duplex == Duplex::Full);
    mac.enable_tx();
    mac.enable_rx();
    mac.set_mac_address(&config.mac_address);

    if config.flow_control {
        mac.enable_tx_flow_control();
        mac.enable_rx_flow_control();
    }

    dma_regs.enable_aal();

    let EthDma { tx, rx } = dma;
    tx.init();
    rx.init();
    dma_regs.set_tx_desc_list(tx.base_addr());
    dma_regs.set_rx_desc_list(rx.base_addr());
    // Length registers hold the descriptor count minus one
    dma_regs.set_tx_ring_len(N.saturating_sub(1) as u32);
    dma_regs.set_rx_ring_len(N.saturating_sub(1) as u32);
    dma_regs.set_rx_buffer_size(BUF);
    dma_regs.set_tx_tail(tx.base_addr());
    dma_regs.set_rx_tail(rx.last_addr());

    dma_regs.start_tx();
    dma_regs.start_rx();

    mac.set_int_enable(0);
    dma_regs.set_int_enable(DMACIER_NIE | DMACIER_RIE);

    let info = InterfaceInfo::from_config(config);
    info!("netif: up, hwaddr {:02x?}, mtu {}", info.hwaddr, info.mtu);

    Ok(NetifParts {
        info,
        tx: Transmitter::new(regs, port, tx, config),
        rx,
        mdio,
    })
}

// =============================================================================
// ARP Timer
// =============================================================================

/// Arm the ARP maintenance timer at `now_ms`.
pub fn arp_timer_start(now_ms: u32) -> PeriodicTimer {
    let mut timer = PeriodicTimer::new(ARP_TMR_INTERVAL_MS);
    timer.arm(now_ms);
    timer
}

/// Run the stack's ARP tick when `timer` is due, then re-arm it.
///
/// Returns whether the tick ran.
pub fn arp_timer<S: NetStack>(timer: &mut PeriodicTimer, now_ms: u32, stack: &mut S) -> bool {
    if !timer.poll(now_ms) {
        return false;
    }
    stack.arp_tick();
    timer.arm(now_ms);
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::boxed::Box;

    use super::*;
    use crate::error::Error;
    use crate::hal::mdio::MdcClockDivider;
    use crate::internal::register::dma::{
        DMACIER_OFFSET, DMACRCR_OFFSET, DMACRCR_SR, DMACRDLAR_OFFSET, DMACRDRLR_OFFSET,
        DMACRDTPR_OFFSET, DMACTCR_OFFSET, DMACTCR_ST, DMACTDLAR_OFFSET, DMACTDRLR_OFFSET,
        DMACTDTPR_OFFSET, DMAMR_OFFSET, DMAMR_SWR, DMASBMR_AAL, DMASBMR_OFFSET,
    };
    use crate::internal::register::mac::{
        MACA0HR_OFFSET, MACA0LR_OFFSET, MACCR_DM, MACCR_FES, MACCR_OFFSET, MACCR_RE, MACCR_TE,
        MACIER_OFFSET, MACMDIOAR_CR_MASK, MACMDIOAR_CR_SHIFT, MACMDIOAR_OFFSET,
        MACQ0TXFCR_OFFSET, MACQ0TXFCR_TFE, MACRXFCR_OFFSET, MACRXFCR_RFE,
    };
    use crate::phy::Lan8740;
    use crate::testing::{ManualPort, MockDelay, MockRegisters, MockStack};

    type SmallDma = EthDma<4, 1536>;

    fn bring_up(
        regs: &MockRegisters,
        port: &ManualPort,
        dma: &mut SmallDma,
        config: &NetifConfig,
    ) -> Result<InterfaceInfo> {
        let mut phy = Lan8740::new(config.phy_addr);
        init(regs, port, MockDelay::new(), &mut phy, dma, config).map(|parts| parts.info)
    }

    // =========================================================================
    // Bring-up
    // =========================================================================

    #[test]
    fn init_programs_mac_and_dma() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let mut dma = Box::new(SmallDma::new());

        let info = bring_up(&regs, &port, &mut *dma, &NetifConfig::new()).unwrap();

        assert!(regs.write_count(DMAMR_OFFSET) >= 1);
        assert_eq!(regs.read(DMAMR_OFFSET) & DMAMR_SWR, 0);
        assert_eq!(
            regs.read(MACCR_OFFSET),
            MACCR_FES | MACCR_DM | MACCR_TE | MACCR_RE
        );
        assert_eq!(regs.read(MACA0HR_OFFSET), 0x5544);
        assert_eq!(regs.read(MACA0LR_OFFSET), 0x3322_1100);
        assert_eq!(regs.read(MACQ0TXFCR_OFFSET) & MACQ0TXFCR_TFE, MACQ0TXFCR_TFE);
        assert_eq!(regs.read(MACRXFCR_OFFSET) & MACRXFCR_RFE, MACRXFCR_RFE);
        assert_eq!(regs.read(DMASBMR_OFFSET) & DMASBMR_AAL, DMASBMR_AAL);
        assert_eq!(
            (regs.read(MACMDIOAR_OFFSET) & MACMDIOAR_CR_MASK) >> MACMDIOAR_CR_SHIFT,
            MdcClockDivider::Div124.to_reg_value()
        );

        assert_eq!(regs.read(DMACTDLAR_OFFSET), dma.tx.base_addr());
        assert_eq!(regs.read(DMACRDLAR_OFFSET), dma.rx.base_addr());
        assert_eq!(regs.read(DMACTDRLR_OFFSET), 3);
        assert_eq!(regs.read(DMACRDRLR_OFFSET), 3);
        assert_eq!(regs.read(DMACTDTPR_OFFSET), dma.tx.base_addr());
        assert_eq!(regs.read(DMACRDTPR_OFFSET), dma.rx.last_addr());
        assert_eq!(regs.read(DMACTCR_OFFSET) & DMACTCR_ST, DMACTCR_ST);
        assert_eq!(regs.read(DMACRCR_OFFSET), DMACRCR_SR | (1536 << 1));

        assert_eq!(regs.read(MACIER_OFFSET), 0);
        assert_eq!(regs.read(DMACIER_OFFSET), DMACIER_NIE | DMACIER_RIE);

        assert_eq!(info.hwaddr, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(info.hwaddr_len, 6);
        assert_eq!(info.mtu, 1500);
        assert!(info.flags.contains(NetifFlags::BROADCAST | NetifFlags::ETHARP));
    }

    #[test]
    fn rx_descriptors_armed_after_init() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let mut dma = Box::new(SmallDma::new());

        bring_up(&regs, &port, &mut *dma, &NetifConfig::new()).unwrap();

        for i in 0..4 {
            assert!(dma.rx.descriptor(i).is_owned());
            assert!(!dma.tx.descriptor(i).is_owned());
        }
    }

    #[test]
    fn half_duplex_without_flow_control() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let mut dma = Box::new(SmallDma::new());
        let config = NetifConfig::new()
            .with_speed(Speed::Mbps10)
            .with_duplex(Duplex::Half)
            .with_flow_control(false);

        bring_up(&regs, &port, &mut *dma, &config).unwrap();

        assert_eq!(regs.read(MACCR_OFFSET), MACCR_TE | MACCR_RE);
        assert_eq!(regs.read(MACQ0TXFCR_OFFSET), 0);
        assert_eq!(regs.read(MACRXFCR_OFFSET), 0);
    }

    #[test]
    fn stuck_software_reset_fails() {
        let regs = MockRegisters::new();
        regs.set_reset_stuck(true);
        let port = ManualPort::new();
        let mut dma = Box::new(SmallDma::new());
        let config = NetifConfig::new().with_sw_reset_timeout_ms(10);

        assert_eq!(
            bring_up(&regs, &port, &mut *dma, &config),
            Err(Error::Config(ConfigError::ResetFailed))
        );
        // Nothing past the reset was touched
        assert_eq!(regs.write_count(MACCR_OFFSET), 0);
        assert_eq!(regs.write_count(DMACIER_OFFSET), 0);
    }

    #[test]
    fn invalid_config_rejected_before_touching_hardware() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let mut dma = Box::new(EthDma::<4, 1024>::new());
        let mut phy = Lan8740::new(1);

        let result = init(&regs, &port, MockDelay::new(), &mut phy, &mut *dma, &NetifConfig::new());
        assert!(matches!(result, Err(Error::Config(ConfigError::InvalidConfig))));
        assert_eq!(regs.write_count(DMAMR_OFFSET), 0);
    }

    #[test]
    fn transmitter_uses_initialized_ring() {
        let regs = MockRegisters::new();
        let port = ManualPort::new();
        let mut dma = Box::new(SmallDma::new());
        let mut phy = Lan8740::new(1);

        let parts = init(&regs, &port, MockDelay::new(), &mut phy, &mut *dma, &NetifConfig::new())
            .unwrap();
        assert_eq!(parts.tx.transmit(&[&[0x55; 60]]), Ok(60));
        assert_eq!(parts.rx.current_index(), 0);
        assert_eq!(parts.tx.ring_len(), 4);
    }

    // =========================================================================
    // Shared State
    // =========================================================================

    #[test]
    fn link_state_set_returns_previous() {
        let link = LinkState::new();
        assert!(!link.is_up());
        assert!(!link.set(true));
        assert!(link.is_up());
        assert!(link.set(false));
    }

    #[test]
    fn default_dma_memory() {
        // 8 + 8 descriptors of 16 bytes, 16 buffers of 1532 bytes
        assert!(EthDmaDefault::memory_usage() >= 16 * 16 + 16 * 1532);
    }

    // =========================================================================
    // ARP Timer
    // =========================================================================

    #[test]
    fn arp_timer_ticks_once_per_interval() {
        let mut stack = MockStack::new();
        let mut timer = arp_timer_start(0);

        assert!(!arp_timer(&mut timer, 999, &mut stack));
        assert!(arp_timer(&mut timer, 1000, &mut stack));
        assert!(!arp_timer(&mut timer, 1500, &mut stack));
        assert!(arp_timer(&mut timer, 2000, &mut stack));
        assert_eq!(stack.arp_ticks(), 2);
    }
}
