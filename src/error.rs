//! Error types for the STM32H7 network interface port
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization and configuration failures
//! - [`DmaError`]: DMA buffer and descriptor issues
//! - [`IoError`]: Runtime TX/RX and PHY failures
//! - [`SysError`]: OS abstraction failures (pools, waits, mailboxes)
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These errors occur during MAC/DMA bring-up or PHY initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// Invalid PHY address (must be 0-31)
    InvalidPhyAddress,
    /// Software reset failed or timed out
    ResetFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::InvalidPhyAddress => "invalid PHY address",
            ConfigError::ResetFailed => "software reset failed",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// DMA buffer and descriptor errors
///
/// These errors relate to descriptor ring management and buffer capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Descriptor is busy (owned by DMA hardware)
    DescriptorBusy,
    /// Frame too large for buffer capacity
    FrameTooLarge,
    /// Invalid frame length (zero or exceeds maximum)
    InvalidLength,
    /// Fatal bus error (unrecoverable DMA error)
    FatalBusError,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::DescriptorBusy => "descriptor busy",
            DmaError::FrameTooLarge => "frame too large for buffers",
            DmaError::InvalidLength => "invalid frame length",
            DmaError::FatalBusError => "fatal DMA bus error",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime TX/RX errors
///
/// These errors occur during frame transmission, reception or PHY access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Resource busy (TX lock not acquired within its bound)
    Busy,
    /// PHY communication error (MDIO timeout or failure)
    PhyError,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Busy => "resource busy",
            IoError::PhyError => "PHY communication error",
        }
    }
}

// =============================================================================
// OS Abstraction Errors
// =============================================================================

/// Errors reported by the OS abstraction bridge
///
/// Exhaustion and timeouts are normal runtime conditions; callers decide
/// whether to retry or drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysError {
    /// Every slot of the object pool is in use
    OutOfResources,
    /// Wait, lock or fetch expired before completion
    Timeout,
    /// Mailbox has no free slot
    Full,
    /// Mailbox holds no message
    Empty,
    /// Handle is stale or belongs to another pool
    InvalidHandle,
}

impl core::fmt::Display for SysError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SysError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SysError::OutOfResources => "out of resources",
            SysError::Timeout => "wait timed out",
            SysError::Full => "mailbox full",
            SysError::Empty => "mailbox empty",
            SysError::InvalidHandle => "invalid handle",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidPhyAddress)) => { /* ... */ }
///     Err(Error::Dma(DmaError::DescriptorBusy)) => { /* ... */ }
///     Err(Error::Io(IoError::Busy)) => { /* ... */ }
///     Err(Error::Sys(SysError::OutOfResources)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
    /// OS abstraction error
    Sys(SysError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
            Error::Sys(e) => write!(f, "sys: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

impl From<SysError> for Error {
    fn from(e: SysError) -> Self {
        Error::Sys(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

/// Result type alias for OS abstraction operations
pub type SysResult<T> = core::result::Result<T, SysError>;

// =============================================================================
// Unit Tests
// =============================================================================
