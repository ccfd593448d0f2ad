//! OS Abstraction Layer
//!
//! Everything the protocol stack needs from the operating system, built from
//! a handful of small pieces:
//!
//! - [`critical`]: nestable critical sections ([`protect`]/[`unprotect`])
//! - [`port`]: the clock/yield seam the RTOS glue implements ([`Port`])
//! - [`pool`]: fixed-capacity object pools handing out generation-checked
//!   [`Handle`]s
//! - [`Semaphore`], [`Mutex`], [`Mailbox`]: the primitives themselves
//! - [`SysArch`]: the bridge exposing them through handle-based
//!   create/destroy/signal/wait calls
//! - [`ThreadSlot`] and [`PeriodicTimer`]: protocol thread hosting and
//!   re-armable timeouts
//!
//! # Blocking Model
//!
//! Blocking calls retry a non-blocking attempt and yield to the scheduler
//! between attempts until they succeed or their deadline passes. Interrupt
//! handlers only ever use the non-blocking entry points
//! ([`Semaphore::signal_from_isr`], [`SysArch::mbox_trypost_from_isr`]).

pub mod arch;
pub mod critical;
pub mod mailbox;
pub mod mutex;
pub mod pool;
pub mod port;
pub mod semaphore;
pub mod thread;
pub mod timer;

pub use arch::{
    MboxHandle, MutexHandle, SemHandle, StatEntry, SysArch, SysArchDefault, SysStats,
};
pub use critical::{CriticalGuard, CriticalSectionCell, ProtectState, protect, unprotect};
pub use mailbox::Mailbox;
pub use mutex::{Mutex, MutexGuard};
pub use pool::{Handle, ObjectPool, PoolObject};
pub use port::{Port, Timeout, wait_for};
pub use semaphore::Semaphore;
pub use thread::{ThreadFn, ThreadSlot};
pub use timer::PeriodicTimer;
