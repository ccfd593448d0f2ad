//! Testing utilities and mock implementations
//!
//! Host-side stand-ins for the hardware and the RTOS so every layer can be
//! exercised with `cargo test`:
//!
//! - [`ManualPort`] / [`StdPort`]: scheduler clocks (simulated and real)
//! - [`MockRegisters`]: the Ethernet register window
//! - [`MockMdioBus`]: a PHY register file
//! - [`MockDelay`]: an `embedded-hal` delay that only counts
//! - [`MockStack`]: a protocol stack that records what it is given
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use std::vec;
use std::vec::Vec;

use crate::driver::stack::{FrameBuffer, NetStack};
use crate::error::Result;
use crate::hal::mdio::MdioBus;
use crate::internal::phy_regs::lan8740::{pscsr, reg};
use crate::internal::phy_regs::standard::{bmcr, bmsr, phy_reg};
use crate::internal::register::EthRegisters;
use crate::internal::register::dma::{DMACSR_OFFSET, DMAMR_OFFSET, DMAMR_SWR};
use crate::internal::register::mac::{
    MACMDIOAR_GOC_MASK, MACMDIOAR_GOC_READ, MACMDIOAR_MB, MACMDIOAR_OFFSET, MACMDIODR_OFFSET,
};
use crate::sys::Port;

// =============================================================================
// Ports
// =============================================================================

/// Simulated clock: every yield advances time by one millisecond.
#[derive(Debug, Default)]
pub struct ManualPort {
    now: AtomicU32,
}

impl ManualPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `ms`, e.g. just before the tick wraps
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now: AtomicU32::new(ms),
        }
    }

    /// Move time forward without yielding
    pub fn advance(&self, ms: u32) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Port for ManualPort {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }

    fn yield_now(&self) {
        self.advance(1);
    }
}

/// Wall-clock port backed by `std::time` and `std::thread::yield_now`.
#[derive(Debug)]
pub struct StdPort {
    start: Instant,
}

impl StdPort {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for StdPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Port for StdPort {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn yield_now(&self) {
        std::thread::yield_now();
    }
}

// =============================================================================
// Mock Register Window
// =============================================================================

/// Size of the emulated register window (covers MAC, MTL and DMA channel 0)
const WINDOW_SIZE: usize = 0x1200;

/// Ethernet register window backed by plain memory.
///
/// Emulates the few hardware side effects the driver relies on:
/// - DMACSR is write-1-to-clear
/// - DMAMR.SWR self-clears (unless [`set_reset_stuck`](Self::set_reset_stuck))
/// - MACMDIOAR.MB self-clears and a read operation loads MACMDIODR with the
///   preset value (unless [`set_mdio_stuck`](Self::set_mdio_stuck))
///
/// Every write is logged.
pub struct MockRegisters {
    words: [AtomicU32; WINDOW_SIZE / 4],
    writes: Mutex<Vec<(usize, u32)>>,
    reset_stuck: AtomicBool,
    mdio_stuck: AtomicBool,
    mdio_read_data: AtomicU32,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self {
            words: [const { AtomicU32::new(0) }; WINDOW_SIZE / 4],
            writes: Mutex::new(Vec::new()),
            reset_stuck: AtomicBool::new(false),
            mdio_stuck: AtomicBool::new(false),
            mdio_read_data: AtomicU32::new(0),
        }
    }

    fn word(&self, offset: usize) -> &AtomicU32 {
        assert!(offset % 4 == 0, "unaligned register offset {offset:#x}");
        &self.words[offset / 4]
    }

    /// Keep DMAMR.SWR set forever
    pub fn set_reset_stuck(&self, stuck: bool) {
        self.reset_stuck.store(stuck, Ordering::SeqCst);
    }

    /// Keep MACMDIOAR.MB set forever
    pub fn set_mdio_stuck(&self, stuck: bool) {
        self.mdio_stuck.store(stuck, Ordering::SeqCst);
    }

    /// Value a PHY register read returns
    pub fn set_mdio_read_data(&self, value: u16) {
        self.mdio_read_data.store(value as u32, Ordering::SeqCst);
    }

    /// Set DMACSR bits as the hardware would
    pub fn raise_status(&self, bits: u32) {
        self.word(DMACSR_OFFSET).fetch_or(bits, Ordering::SeqCst);
    }

    /// Last value written to `offset`
    pub fn last_write(&self, offset: usize) -> Option<u32> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
    }

    /// Number of writes to `offset`
    pub fn write_count(&self, offset: usize) -> usize {
        self.writes.lock().unwrap().iter().filter(|(o, _)| *o == offset).count()
    }
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl EthRegisters for MockRegisters {
    fn read(&self, offset: usize) -> u32 {
        self.word(offset).load(Ordering::SeqCst)
    }

    fn write(&self, offset: usize, value: u32) {
        self.writes.lock().unwrap().push((offset, value));

        match offset {
            DMACSR_OFFSET => {
                self.word(offset).fetch_and(!value, Ordering::SeqCst);
            }
            DMAMR_OFFSET if !self.reset_stuck.load(Ordering::SeqCst) => {
                self.word(offset).store(value & !DMAMR_SWR, Ordering::SeqCst);
            }
            MACMDIOAR_OFFSET
                if value & MACMDIOAR_MB != 0 && !self.mdio_stuck.load(Ordering::SeqCst) =>
            {
                if value & MACMDIOAR_GOC_MASK == MACMDIOAR_GOC_READ {
                    let data = self.mdio_read_data.load(Ordering::SeqCst);
                    self.word(MACMDIODR_OFFSET).store(data, Ordering::SeqCst);
                }
                self.word(offset).store(value & !MACMDIOAR_MB, Ordering::SeqCst);
            }
            _ => self.word(offset).store(value, Ordering::SeqCst),
        }
    }
}

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// Mock MDIO bus for testing PHY drivers without hardware
///
/// Holds a register file per PHY address and records every write.
/// BMCR.RESET self-clears unless [`set_reset_stuck`](Self::set_reset_stuck)
/// is set.
///
/// # Example
///
/// ```ignore
/// let mut mdio = MockMdioBus::new();
/// mdio.setup_lan8740(1);
/// mdio.simulate_link_up_100_fd(1);
///
/// let phy = Lan8740::new(1);
/// assert!(phy.is_link_up(&mut mdio).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MockMdioBus {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: RefCell<HashMap<(u8, u8), u16>>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: RefCell<Vec<(u8, u8, u16)>>,
    reset_stuck: RefCell<bool>,
}

impl MockMdioBus {
    /// Create a new mock MDIO bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value
    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers.borrow_mut().insert((phy_addr, reg_addr), value);
    }

    /// Get the current value of a register (for test verification)
    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.borrow().get(&(phy_addr, reg_addr)).copied()
    }

    /// Get all writes that have been made
    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.write_log.borrow().clone()
    }

    /// Keep BMCR.RESET set after it is written
    pub fn set_reset_stuck(&self, stuck: bool) {
        *self.reset_stuck.borrow_mut() = stuck;
    }

    /// Setup for a LAN8740 PHY with power-on register values
    pub fn setup_lan8740(&self, phy_addr: u8) {
        self.set_register(phy_addr, phy_reg::PHYIDR1, 0x0007);
        self.set_register(phy_addr, phy_reg::PHYIDR2, 0xC111);

        // Capabilities, link down
        let bmsr_value = bmsr::TX_FD_CAPABLE | bmsr::TX_HD_CAPABLE | bmsr::AN_ABILITY;
        self.set_register(phy_addr, phy_reg::BMSR, bmsr_value);
        self.set_register(phy_addr, phy_reg::BMCR, bmcr::AN_ENABLE | bmcr::SPEED_100);
        self.set_register(phy_addr, reg::PSCSR, 0);
    }

    /// Simulate link coming up with 100 Mbps Full Duplex
    pub fn simulate_link_up_100_fd(&self, phy_addr: u8) {
        let bmsr_val = self.get_register(phy_addr, phy_reg::BMSR).unwrap_or(0);
        self.set_register(
            phy_addr,
            phy_reg::BMSR,
            bmsr_val | bmsr::LINK_STATUS | bmsr::AN_COMPLETE,
        );
        self.set_register(phy_addr, reg::PSCSR, pscsr::AUTODONE | pscsr::SPEED_100_FD);
    }

    /// Simulate link going down
    pub fn simulate_link_down(&self, phy_addr: u8) {
        let bmsr_val = self.get_register(phy_addr, phy_reg::BMSR).unwrap_or(0);
        self.set_register(
            phy_addr,
            phy_reg::BMSR,
            bmsr_val & !(bmsr::LINK_STATUS | bmsr::AN_COMPLETE),
        );
        self.set_register(phy_addr, reg::PSCSR, 0);
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Ok(self.get_register(phy_addr, reg_addr).unwrap_or(0))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.write_log.borrow_mut().push((phy_addr, reg_addr, value));

        let stored = if reg_addr == phy_reg::BMCR && !*self.reset_stuck.borrow() {
            value & !bmcr::RESET
        } else {
            value
        };
        self.set_register(phy_addr, reg_addr, stored);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        false
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting. Works by value
/// or by reference, so a test can keep the counter while a driver owns the
/// delay.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
    }
}

impl embedded_hal::delay::DelayNs for &MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
    }
}

// =============================================================================
// Mock Protocol Stack
// =============================================================================

/// Packet buffer handed out by [`MockStack`]
#[derive(Debug)]
pub struct MockBuffer(Vec<u8>);

impl FrameBuffer for MockBuffer {
    fn copy_from(&mut self, data: &[u8]) {
        self.0[..data.len()].copy_from_slice(data);
    }
}

/// Protocol stack that records delivered frames and link changes.
#[derive(Debug, Default)]
pub struct MockStack {
    frames: Vec<Vec<u8>>,
    fail_alloc: bool,
    fail_input: bool,
    released: usize,
    link: bool,
    link_changes: usize,
    arp_ticks: usize,
}

impl MockStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every allocation fail
    pub fn fail_alloc(&mut self, fail: bool) {
        self.fail_alloc = fail;
    }

    /// Make every input call reject its frame
    pub fn fail_input(&mut self, fail: bool) {
        self.fail_input = fail;
    }

    /// Frames accepted so far
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.clone()
    }

    /// Buffers returned through `release`
    pub fn released(&self) -> usize {
        self.released
    }

    /// Number of `set_link` calls
    pub fn link_changes(&self) -> usize {
        self.link_changes
    }

    /// Number of ARP ticks
    pub fn arp_ticks(&self) -> usize {
        self.arp_ticks
    }
}

impl NetStack for MockStack {
    type Buffer = MockBuffer;

    fn alloc(&mut self, len: usize) -> Option<MockBuffer> {
        (!self.fail_alloc).then(|| MockBuffer(vec![0; len]))
    }

    fn input(&mut self, buffer: MockBuffer) -> core::result::Result<(), MockBuffer> {
        if self.fail_input {
            return Err(buffer);
        }
        self.frames.push(buffer.0);
        Ok(())
    }

    fn release(&mut self, _buffer: MockBuffer) {
        self.released += 1;
    }

    fn link_up(&self) -> bool {
        self.link
    }

    fn set_link(&mut self, up: bool) {
        self.link = up;
        self.link_changes += 1;
    }

    fn arp_tick(&mut self) {
        self.arp_ticks += 1;
    }
}
