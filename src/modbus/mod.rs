//! Modbus RTU master for the RS-485 soil probe.
//!
//! Two layers, split so the pure parts stay unit-testable against literal
//! byte vectors:
//!
//! - [`frame`] — request construction, CRC16, response validation.
//!   Stateless, no I/O.
//! - [`transport`] — one half-duplex request/response transaction over a
//!   shared differential bus, driving the DE/RE direction pin with the
//!   settle delays the transceiver needs.
//!
//! Only function code 0x03 (read holding registers) is supported; the probe
//! answers nothing else and there is a single fixed slave on the bus.

pub mod frame;
pub mod transport;

/// Modbus function code: read holding registers.
pub const FUNC_READ_HOLDING: u8 = 0x03;

/// Length of a read-holding-registers request frame.
pub const REQUEST_LEN: usize = 8;

/// Minimum usable response length for a single-register read:
/// `[addr][func][byte count][val hi][val lo][crc lo][crc hi]`.
pub const RESPONSE_MIN_LEN: usize = 7;

/// Response buffer size.  The probe occasionally pads a trailing byte, so
/// we collect up to 9 and validate on whatever arrived.
pub const RESPONSE_BUF_LEN: usize = 9;

// ---------------------------------------------------------------------------
// Soil probe register map
// ---------------------------------------------------------------------------

/// Holding registers of the 7-in-1 NPK soil probe, in poll order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SoilRegister {
    Moisture = 0x0000,
    Temperature = 0x0001,
    Conductivity = 0x0002,
    Ph = 0x0003,
    Nitrogen = 0x0004,
    Phosphorus = 0x0005,
    Potassium = 0x0006,
}

impl SoilRegister {
    /// All registers in the fixed order a poll cycle reads them.
    pub const ALL: [Self; 7] = [
        Self::Moisture,
        Self::Temperature,
        Self::Conductivity,
        Self::Ph,
        Self::Nitrogen,
        Self::Phosphorus,
        Self::Potassium,
    ];

    /// Register address on the wire.
    pub const fn addr(self) -> u16 {
        self as u16
    }

    /// Human-readable name for log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Moisture => "moisture",
            Self::Temperature => "temperature",
            Self::Conductivity => "conductivity",
            Self::Ph => "pH",
            Self::Nitrogen => "nitrogen",
            Self::Phosphorus => "phosphorus",
            Self::Potassium => "potassium",
        }
    }
}
