//! Unified error types for the SoilGuard firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform.  All variants are `Copy`
//! so they can be cheaply passed through the control loop without
//! allocation.
//!
//! Nothing in this taxonomy is fatal: bus errors degrade a single register
//! read, probe errors degrade a single snapshot, and the next poll cycle
//! retries the bus with no backoff beyond the polling cadence.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An RS-485 Modbus transaction failed.
    Bus(BusError),
    /// The soil probe produced an unusable snapshot.
    Probe(ProbeError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Probe(e) => write!(f, "probe: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bus errors (per Modbus transaction)
// ---------------------------------------------------------------------------

/// Failure of a single Modbus RTU transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Fewer bytes than a minimal response arrived before the transaction
    /// deadline.
    Timeout,
    /// CRC mismatch or echoed function code mismatch on a response.
    CorruptFrame,
    /// The underlying serial driver reported an I/O failure.
    Io,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "response timeout"),
            Self::CorruptFrame => write!(f, "corrupt frame"),
            Self::Io => write!(f, "serial I/O failed"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Probe errors (per poll cycle)
// ---------------------------------------------------------------------------

/// Snapshot-level failure of a full 7-register poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// Fewer than the required minimum of the 7 register reads succeeded.
    /// Carries the number that did.
    InsufficientValidRegisters(u8),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientValidRegisters(valid) => {
                write!(f, "only {valid}/7 registers valid")
            }
        }
    }
}

impl From<ProbeError> for Error {
    fn from(e: ProbeError) -> Self {
        Self::Probe(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
