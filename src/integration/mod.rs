//! External Stack Integrations
//!
//! - **smoltcp** (`smoltcp`): runs the smoltcp TCP/IP stack on the driver
//!   - `smoltcp::phy::Device` over the shared transmitter
//!   - RX frame queue filled by the RX worker
//!   - Requires `smoltcp` feature

#[cfg(feature = "smoltcp")]
pub mod smoltcp;

#[cfg(feature = "smoltcp")]
pub use smoltcp::{FrameQueue, FrameSlot, SmoltcpDevice, ethernet_address};
