//! 7-in-1 NPK soil probe driver (RS-485 Modbus RTU).
//!
//! One [`poll`](NpkProbe::poll) sequences seven single-register reads in a
//! fixed order with a recovery gap between them — this probe class drops
//! requests issued back-to-back — and folds the results into one
//! [`SoilSnapshot`] under the majority-valid policy:
//!
//! - a register that times out or fails CRC degrades to a per-field
//!   sentinel, and polling continues;
//! - a cycle with fewer than 4 valid registers replaces the snapshot with
//!   a fresh all-sentinel one marked unavailable.
//!
//! Neither case stops future polls; the bus is simply retried next cycle.

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::error::{BusError, ProbeError};
use crate::modbus::frame::{build_read_request, parse_read_response};
use crate::modbus::transport::{Clock, Rs485Transport, SerialBus};
use crate::modbus::{FUNC_READ_HOLDING, RESPONSE_MIN_LEN, SoilRegister};
use crate::sensors::{
    SENTINEL_CONDUCTIVITY, SENTINEL_MOISTURE, SENTINEL_PH, SENTINEL_TEMPERATURE, SoilSnapshot,
};

/// Raw register value recorded when a read fails.
pub const INVALID_RAW: u16 = 0xFFFF;

/// A snapshot needs at least this many of the 7 registers to be usable.
pub const MIN_VALID_REGISTERS: u8 = 4;

/// Modbus master for the soil probe.
pub struct NpkProbe<B, P, C> {
    transport: Rs485Transport<B, P, C>,
    slave_addr: u8,
    inter_read_delay_ms: u32,
    snapshot: SoilSnapshot,
}

impl<B, P, C> NpkProbe<B, P, C>
where
    B: SerialBus,
    P: OutputPin,
    C: Clock,
{
    pub fn new(transport: Rs485Transport<B, P, C>, config: &SystemConfig) -> Self {
        Self {
            transport,
            slave_addr: config.npk_slave_addr,
            inter_read_delay_ms: config.inter_read_delay_ms,
            snapshot: SoilSnapshot::default(),
        }
    }

    /// The snapshot produced by the most recent poll (all-sentinel and
    /// unavailable before the first one).
    pub fn snapshot(&self) -> SoilSnapshot {
        self.snapshot
    }

    /// Run one full poll cycle and replace the stored snapshot wholesale.
    ///
    /// `Err` means fewer than [`MIN_VALID_REGISTERS`] reads succeeded; the
    /// stored snapshot is then the fresh all-sentinel unavailable one.
    /// Previous good values are deliberately not retained.
    pub fn poll(&mut self) -> Result<SoilSnapshot, ProbeError> {
        let mut raw = [INVALID_RAW; SoilRegister::ALL.len()];

        for (slot, reg) in raw.iter_mut().zip(SoilRegister::ALL) {
            *slot = self.read_register(reg);
            // The probe needs recovery time between transactions.
            self.transport.clock_mut().delay_ms(self.inter_read_delay_ms);
        }

        let valid = raw.iter().filter(|&&v| v != INVALID_RAW).count() as u8;
        if valid < MIN_VALID_REGISTERS {
            self.snapshot = SoilSnapshot::default();
            warn!("soil probe poll failed: only {valid}/7 registers valid");
            return Err(ProbeError::InsufficientValidRegisters(valid));
        }

        let scaled = |v: u16, divisor: f32, sentinel: f32| {
            if v == INVALID_RAW {
                sentinel
            } else {
                f32::from(v) / divisor
            }
        };
        let counted = |v: u16| if v == INVALID_RAW { 0 } else { v };

        self.snapshot = SoilSnapshot {
            moisture_pct: scaled(raw[0], 10.0, SENTINEL_MOISTURE),
            temperature_c: scaled(raw[1], 10.0, SENTINEL_TEMPERATURE),
            conductivity_ms_cm: scaled(raw[2], 1000.0, SENTINEL_CONDUCTIVITY),
            ph: scaled(raw[3], 10.0, SENTINEL_PH),
            nitrogen_mg_kg: counted(raw[4]),
            phosphorus_mg_kg: counted(raw[5]),
            potassium_mg_kg: counted(raw[6]),
            valid_registers: valid,
            available: true,
        };

        info!(
            "soil probe: moisture={:.1}% temp={:.1}C ec={:.3}mS/cm pH={:.1} N={} P={} K={} ({valid}/7 valid)",
            self.snapshot.moisture_pct,
            self.snapshot.temperature_c,
            self.snapshot.conductivity_ms_cm,
            self.snapshot.ph,
            self.snapshot.nitrogen_mg_kg,
            self.snapshot.phosphorus_mg_kg,
            self.snapshot.potassium_mg_kg,
        );

        Ok(self.snapshot)
    }

    /// Read one holding register.  Returns [`INVALID_RAW`] on timeout or
    /// corruption — per-register failures degrade, never abort the cycle.
    fn read_register(&mut self, reg: SoilRegister) -> u16 {
        let request = build_read_request(self.slave_addr, FUNC_READ_HOLDING, reg.addr(), 1);

        let response = match self.transport.transact(&request, RESPONSE_MIN_LEN) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("soil probe {} (0x{:04X}): {e}", reg.name(), reg.addr());
                return INVALID_RAW;
            }
        };

        if response.len() < RESPONSE_MIN_LEN {
            warn!(
                "soil probe {} (0x{:04X}): {} ({} bytes)",
                reg.name(),
                reg.addr(),
                BusError::Timeout,
                response.len()
            );
            return INVALID_RAW;
        }

        match parse_read_response(&response, FUNC_READ_HOLDING) {
            Ok(value) => {
                debug!("soil probe {} (0x{:04X}) = {value}", reg.name(), reg.addr());
                value
            }
            Err(e) => {
                warn!("soil probe {} (0x{:04X}): {e}", reg.name(), reg.addr());
                INVALID_RAW
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
