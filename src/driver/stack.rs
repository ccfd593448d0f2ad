//! Boundary between the Ethernet driver and the protocol stack.
//!
//! The driver never allocates: received frames are copied into buffers the
//! stack hands out, and ownership of each buffer passes back to the stack
//! (accepted) or is returned for release (rejected).

/// A stack-owned packet buffer the driver can fill.
pub trait FrameBuffer {
    /// Copy `data` into the buffer, starting at its beginning.
    ///
    /// The buffer was allocated with at least `data.len()` bytes.
    fn copy_from(&mut self, data: &[u8]);
}

/// Protocol stack services used by the RX worker and the timers.
pub trait NetStack {
    /// Packet buffer type of the stack
    type Buffer: FrameBuffer;

    /// Allocate a buffer holding `len` bytes, or `None` when out of memory
    fn alloc(&mut self, len: usize) -> Option<Self::Buffer>;

    /// Hand a filled frame to the stack.
    ///
    /// On rejection the buffer comes back and the caller releases it.
    fn input(&mut self, buffer: Self::Buffer) -> Result<(), Self::Buffer>;

    /// Free a buffer the stack did not take
    fn release(&mut self, buffer: Self::Buffer);

    /// Link state the stack currently believes in
    fn link_up(&self) -> bool;

    /// Tell the stack the link went up or down
    fn set_link(&mut self, up: bool);

    /// Periodic ARP cache maintenance
    fn arp_tick(&mut self) {}
}

impl<T: NetStack + ?Sized> NetStack for &mut T {
    type Buffer = T::Buffer;

    fn alloc(&mut self, len: usize) -> Option<Self::Buffer> {
        (**self).alloc(len)
    }

    fn input(&mut self, buffer: Self::Buffer) -> Result<(), Self::Buffer> {
        (**self).input(buffer)
    }

    fn release(&mut self, buffer: Self::Buffer) {
        (**self).release(buffer);
    }

    fn link_up(&self) -> bool {
        (**self).link_up()
    }

    fn set_link(&mut self, up: bool) {
        (**self).set_link(up);
    }

    fn arp_tick(&mut self) {
        (**self).arp_tick();
    }
}
