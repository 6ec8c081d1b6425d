//! Modbus RTU frame construction and validation.
//!
//! Request layout (read holding registers, 8 bytes):
//!
//! ```text
//! ┌───────┬───────┬────────┬────────┬──────────┬──────────┬────────┬────────┐
//! │ slave │ 0x03  │ reg hi │ reg lo │ count hi │ count lo │ crc lo │ crc hi │
//! └───────┴───────┴────────┴────────┴──────────┴──────────┴────────┴────────┘
//! ```
//!
//! CRC16 uses the standard Modbus polynomial (init 0xFFFF, reflected,
//! XOR 0xA001) over everything before the trailer, appended little-endian.
//!
//! Pure data transformation — no state, no I/O.

use crate::error::BusError;
use crate::modbus::REQUEST_LEN;

/// Compute the Modbus CRC16 over `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Build a read-holding-registers request frame.
pub fn build_read_request(slave: u8, function: u8, register: u16, count: u16) -> [u8; REQUEST_LEN] {
    let mut frame = [0u8; REQUEST_LEN];
    frame[0] = slave;
    frame[1] = function;
    frame[2..4].copy_from_slice(&register.to_be_bytes());
    frame[4..6].copy_from_slice(&count.to_be_bytes());
    let crc = crc16(&frame[..6]);
    frame[6..8].copy_from_slice(&crc.to_le_bytes());
    frame
}

/// Validate a response frame and extract the single-register value.
///
/// `frame` is whatever the transport collected; the caller has already
/// established it is at least [`RESPONSE_MIN_LEN`](crate::modbus::RESPONSE_MIN_LEN)
/// bytes.  The trailing two bytes are the little-endian CRC over everything
/// before them.  A CRC mismatch or an echoed function code that differs
/// from `expected_func` is a corrupt frame.
pub fn parse_read_response(frame: &[u8], expected_func: u8) -> Result<u16, BusError> {
    let n = frame.len();
    debug_assert!(n >= crate::modbus::RESPONSE_MIN_LEN);

    let received_crc = u16::from_le_bytes([frame[n - 2], frame[n - 1]]);
    if crc16(&frame[..n - 2]) != received_crc {
        return Err(BusError::CorruptFrame);
    }
    if frame[1] != expected_func {
        return Err(BusError::CorruptFrame);
    }
    Ok(u16::from_be_bytes([frame[3], frame[4]]))
}
