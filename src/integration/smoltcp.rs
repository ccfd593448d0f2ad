//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! Runs [smoltcp](https://docs.rs/smoltcp) on top of the driver's task split:
//! the RX worker fills a [`FrameQueue`] (it implements [`NetStack`]) and the
//! interface task drains it through [`SmoltcpDevice`], which transmits through
//! the shared [`Transmitter`].
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::iface::{Config, Interface};
//! use ph_stm32h7_netif::integration::smoltcp::{FrameQueue, SmoltcpDevice, ethernet_address};
//!
//! static QUEUE: FrameQueue<4, 1532> = FrameQueue::new();
//!
//! let parts = init(regs, port, delay, &mut phy, dma, &config)?;
//! // RX task: RxWorker::new(regs, port, parts.rx, &SIGNAL, &LINK, &QUEUE).run()
//! let mut device = SmoltcpDevice::new(&parts.tx, &QUEUE, &parts.info);
//! let config = Config::new(ethernet_address(&parts.info).into());
//! let mut iface = Interface::new(config, &mut device, smoltcp::time::Instant::ZERO);
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use smoltcp::phy::{ChecksumCapabilities, Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;
use smoltcp::wire::EthernetAddress;

use crate::driver::netif::InterfaceInfo;
use crate::driver::stack::{FrameBuffer, NetStack};
use crate::driver::transmit::Transmitter;
use crate::internal::constants::ETH_HEADER_SIZE;
use crate::internal::register::EthRegisters;
use crate::sys::{CriticalSectionCell, Port};

// =============================================================================
// Frame Queue
// =============================================================================

/// One received frame in flight between the RX worker and smoltcp.
pub struct FrameSlot<const BUF: usize> {
    data: [u8; BUF],
    len: usize,
}

impl<const BUF: usize> FrameSlot<BUF> {
    const EMPTY: Self = Self {
        data: [0; BUF],
        len: 0,
    };

    /// Frame bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl<const BUF: usize> FrameBuffer for FrameSlot<BUF> {
    fn copy_from(&mut self, data: &[u8]) {
        let len = data.len().min(BUF);
        self.data[..len].copy_from_slice(&data[..len]);
        self.len = len;
    }
}

struct QueueState<const DEPTH: usize, const BUF: usize> {
    slots: [FrameSlot<BUF>; DEPTH],
    head: usize,
    count: usize,
}

/// Fixed-depth FIFO of received frames.
///
/// `&FrameQueue` is the [`NetStack`] given to the RX worker; a full queue
/// rejects the frame and the worker counts it.
pub struct FrameQueue<const DEPTH: usize, const BUF: usize> {
    state: CriticalSectionCell<QueueState<DEPTH, BUF>>,
    link: AtomicBool,
}

impl<const DEPTH: usize, const BUF: usize> FrameQueue<DEPTH, BUF> {
    /// Create an empty queue (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(QueueState {
                slots: [const { FrameSlot::EMPTY }; DEPTH],
                head: 0,
                count: 0,
            }),
            link: AtomicBool::new(false),
        }
    }

    /// Append a frame, handing it back when the queue is full.
    pub fn push(&self, slot: FrameSlot<BUF>) -> Result<(), FrameSlot<BUF>> {
        self.state.with(|state| {
            if state.count == DEPTH {
                return Err(slot);
            }
            let index = (state.head + state.count) % DEPTH;
            state.slots[index] = slot;
            state.count += 1;
            Ok(())
        })
    }

    /// Copy the oldest frame into `out` and drop it from the queue.
    ///
    /// Returns the number of bytes copied. A frame longer than `out` is
    /// truncated.
    pub fn pop_into(&self, out: &mut [u8]) -> Option<usize> {
        self.state.with(|state| {
            if state.count == 0 {
                return None;
            }
            let frame = state.slots[state.head].as_slice();
            let len = frame.len().min(out.len());
            out[..len].copy_from_slice(&frame[..len]);
            state.head = (state.head + 1) % DEPTH;
            state.count -= 1;
            Some(len)
        })
    }

    /// Frames waiting
    pub fn len(&self) -> usize {
        self.state.with(|state| state.count)
    }

    /// Whether no frame is waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Link state last reported by the RX worker
    pub fn is_link_up(&self) -> bool {
        self.link.load(Ordering::Acquire)
    }
}

impl<const DEPTH: usize, const BUF: usize> Default for FrameQueue<DEPTH, BUF> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize, const BUF: usize> NetStack for &FrameQueue<DEPTH, BUF> {
    type Buffer = FrameSlot<BUF>;

    fn alloc(&mut self, len: usize) -> Option<Self::Buffer> {
        (len <= BUF).then_some(FrameSlot::EMPTY)
    }

    fn input(&mut self, buffer: Self::Buffer) -> Result<(), Self::Buffer> {
        self.push(buffer)
    }

    fn release(&mut self, _buffer: Self::Buffer) {}

    fn link_up(&self) -> bool {
        self.is_link_up()
    }

    fn set_link(&mut self, up: bool) {
        self.link.store(up, Ordering::Release);
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Receive token: pops one frame from the queue when consumed.
pub struct QueueRxToken<'a, const DEPTH: usize, const BUF: usize> {
    queue: &'a FrameQueue<DEPTH, BUF>,
}

impl<const DEPTH: usize, const BUF: usize> smoltcp::phy::RxToken for QueueRxToken<'_, DEPTH, BUF> {
    fn consume<T, F>(self, f: F) -> T
    where
        F: FnOnce(&[u8]) -> T,
    {
        let mut frame = [0u8; BUF];
        let len = self.queue.pop_into(&mut frame).unwrap_or_default();
        f(&frame[..len])
    }
}

/// Transmit token: sends one frame through the shared transmitter.
pub struct NetifTxToken<'a, 'r, R, P, const N: usize, const BUF: usize> {
    tx: &'a Transmitter<'r, R, P, N, BUF>,
}

impl<R, P, const N: usize, const BUF: usize> smoltcp::phy::TxToken
    for NetifTxToken<'_, '_, R, P, N, BUF>
where
    R: EthRegisters,
    P: Port,
{
    fn consume<T, F>(self, len: usize, f: F) -> T
    where
        F: FnOnce(&mut [u8]) -> T,
    {
        let mut frame = [0u8; BUF];
        if len > BUF {
            // The closure still needs a buffer; nothing built in it is sent
            warn!("smoltcp: {len}-byte frame exceeds {BUF}-byte buffer, dropped");
            return f(&mut frame);
        }
        let result = f(&mut frame[..len]);

        // smoltcp retransmits at the protocol level
        if let Err(err) = self.tx.transmit(&[&frame[..len]]) {
            warn!("smoltcp: frame dropped: {err:?}");
        }
        result
    }
}

// =============================================================================
// Device Implementation
// =============================================================================

/// smoltcp device over the driver's TX path and RX frame queue.
pub struct SmoltcpDevice<'d, 'r, R, P, const N: usize, const BUF: usize, const DEPTH: usize> {
    tx: &'d Transmitter<'r, R, P, N, BUF>,
    queue: &'d FrameQueue<DEPTH, BUF>,
    mtu: usize,
}

impl<'d, 'r, R, P, const N: usize, const BUF: usize, const DEPTH: usize>
    SmoltcpDevice<'d, 'r, R, P, N, BUF, DEPTH>
{
    /// Bind the transmitter and the RX queue of an initialized interface.
    pub fn new(
        tx: &'d Transmitter<'r, R, P, N, BUF>,
        queue: &'d FrameQueue<DEPTH, BUF>,
        info: &InterfaceInfo,
    ) -> Self {
        Self {
            tx,
            queue,
            mtu: usize::from(info.mtu),
        }
    }
}

impl<'r, R, P, const N: usize, const BUF: usize, const DEPTH: usize> Device
    for SmoltcpDevice<'_, 'r, R, P, N, BUF, DEPTH>
where
    R: EthRegisters,
    P: Port,
{
    type RxToken<'a>
        = QueueRxToken<'a, DEPTH, BUF>
    where
        Self: 'a;
    type TxToken<'a>
        = NetifTxToken<'a, 'r, R, P, N, BUF>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        if self.queue.is_empty() {
            return None;
        }
        Some((QueueRxToken { queue: self.queue }, NetifTxToken { tx: self.tx }))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.tx.is_busy() {
            return None;
        }
        Some(NetifTxToken { tx: self.tx })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.medium = Medium::Ethernet;
        // For Ethernet smoltcp counts the link header in the MTU
        caps.max_transmission_unit = self.mtu + ETH_HEADER_SIZE;
        caps.max_burst_size = Some(1);
        // No checksum offload is configured
        caps.checksum = ChecksumCapabilities::default();
        caps
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Station address of the interface as a smoltcp `EthernetAddress`.
pub fn ethernet_address(info: &InterfaceInfo) -> EthernetAddress {
    EthernetAddress(info.hwaddr)
}
