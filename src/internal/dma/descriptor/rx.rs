//! RX DMA descriptor for frame reception.

use super::bits::rdes3;
use super::{Ownership, VolatileCell, publish_barrier};

/// Decoded write-back status of a completed RX descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStatus {
    /// First descriptor of the frame
    pub first: bool,
    /// Last descriptor of the frame
    pub last: bool,
    /// Error summary bit
    pub error: bool,
    /// Packet length reported by hardware, CRC included
    pub packet_len: usize,
}

impl RxStatus {
    /// Decode from a write-back RDES3 word.
    #[must_use]
    pub const fn from_rdes3(word: u32) -> Self {
        Self {
            first: word & rdes3::FD != 0,
            last: word & rdes3::LD != 0,
            error: word & rdes3::ES != 0,
            packet_len: (word & rdes3::PL_MASK) as usize,
        }
    }

    /// Whole frame landed in this one descriptor.
    #[inline(always)]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.first && self.last
    }
}

/// RX DMA descriptor (16 bytes, normal descriptor format).
#[repr(C, align(16))]
pub struct RxDescriptor {
    /// RDES0: Buffer 1 address (read) / VLAN tags (write-back)
    rdes0: VolatileCell<u32>,
    /// RDES1: Reserved (read) / extended status (write-back)
    rdes1: VolatileCell<u32>,
    /// RDES2: Buffer 2 address (read) / filter status (write-back)
    rdes2: VolatileCell<u32>,
    /// RDES3: Control (read) / status and length (write-back)
    rdes3: VolatileCell<u32>,
}

impl RxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed RX descriptor, owned by software.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rdes0: VolatileCell::new(0),
            rdes1: VolatileCell::new(0),
            rdes2: VolatileCell::new(0),
            rdes3: VolatileCell::new(0),
        }
    }

    /// Give the buffer at `buffer_addr` to the DMA for reception.
    ///
    /// The write-back overwrites RDES0, so the address is reprogrammed on
    /// every re-arm. OWN goes last behind a barrier.
    pub fn arm(&self, buffer_addr: u32) {
        self.rdes0.set(buffer_addr);
        self.rdes1.set(0);
        self.rdes2.set(0);
        publish_barrier();
        self.rdes3.set(rdes3::OWN | rdes3::IOC | rdes3::BUF1V);
    }

    /// Current owner of the descriptor.
    #[inline(always)]
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        Ownership::from_word(self.rdes3.get())
    }

    /// Check if descriptor is owned by DMA.
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.ownership() == Ownership::Hardware
    }

    /// Write-back status, or `None` while the DMA still owns the descriptor.
    #[must_use]
    pub fn status(&self) -> Option<RxStatus> {
        let word = self.rdes3.get();
        match Ownership::from_word(word) {
            Ownership::Hardware => None,
            Ownership::Software => Some(RxStatus::from_rdes3(word)),
        }
    }

    /// Error bits from the write-back word.
    #[inline(always)]
    #[must_use]
    pub fn error_flags(&self) -> u32 {
        self.rdes3.get() & rdes3::ALL_ERRORS
    }

    /// Raw descriptor words, for diagnostics.
    #[must_use]
    pub fn raw(&self) -> [u32; 4] {
        [
            self.rdes0.get(),
            self.rdes1.get(),
            self.rdes2.get(),
            self.rdes3.get(),
        ]
    }

    /// Emulate DMA write-back of a `packet_len` byte frame with extra RDES3 flags.
    #[cfg(test)]
    pub fn simulate_receive(&self, packet_len: usize, flags: u32) {
        self.rdes0.set(0);
        self.rdes3
            .set((packet_len as u32 & rdes3::PL_MASK) | (flags & !rdes3::OWN));
    }
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_descriptor_layout() {
        assert_eq!(core::mem::size_of::<RxDescriptor>(), RxDescriptor::SIZE);
        assert_eq!(core::mem::align_of::<RxDescriptor>(), 16);
    }

    #[test]
    fn arm_hands_to_hardware() {
        let desc = RxDescriptor::new();
        desc.arm(0x3000_0000);

        let [w0, w1, w2, w3] = desc.raw();
        assert_eq!(w0, 0x3000_0000);
        assert_eq!(w1, 0);
        assert_eq!(w2, 0);
        assert_eq!(w3, rdes3::OWN | rdes3::IOC | rdes3::BUF1V);
        assert!(desc.is_owned());
        assert_eq!(desc.status(), None);
    }

    #[test]
    fn status_decodes_complete_frame() {
        let desc = RxDescriptor::new();
        desc.arm(0x1000);
        desc.simulate_receive(64, rdes3::FD | rdes3::LD);

        let status = desc.status().unwrap();
        assert!(status.is_complete());
        assert!(!status.error);
        assert_eq!(status.packet_len, 64);
    }

    #[test]
    fn status_decodes_fragment_and_error() {
        let desc = RxDescriptor::new();
        desc.simulate_receive(1536, rdes3::FD);
        let status = desc.status().unwrap();
        assert!(status.first);
        assert!(!status.last);
        assert!(!status.is_complete());

        desc.simulate_receive(80, rdes3::FD | rdes3::LD | rdes3::ES | rdes3::CE);
        let status = desc.status().unwrap();
        assert!(status.error);
        assert_eq!(desc.error_flags(), rdes3::CE);
    }

    #[test]
    fn rearm_restores_buffer_address() {
        let desc = RxDescriptor::new();
        desc.arm(0x1000);
        desc.simulate_receive(64, rdes3::FD | rdes3::LD);
        assert_eq!(desc.raw()[0], 0);
        desc.arm(0x1000);
        assert_eq!(desc.raw()[0], 0x1000);
    }
}
