//! Sensor subsystem — the RS-485 soil probe and its snapshot data model.
//!
//! The probe produces a [`SoilSnapshot`] per poll cycle that the service
//! layer feeds into the irrigation controller and the telemetry surface.

pub mod npk;

use serde::Serialize;

/// Sentinel for a moisture field whose register read failed this cycle.
pub const SENTINEL_MOISTURE: f32 = -1.0;
/// Sentinel for a failed soil-temperature read.  −100 °C is outside any
/// physically possible reading.
pub const SENTINEL_TEMPERATURE: f32 = -100.0;
/// Sentinel for a failed conductivity read.
pub const SENTINEL_CONDUCTIVITY: f32 = -1.0;
/// Sentinel for a failed pH read.
pub const SENTINEL_PH: f32 = -1.0;

/// A point-in-time snapshot of the 7-in-1 soil probe.
///
/// `available` is a snapshot-level majority flag, **not** "all fields
/// valid": a snapshot can be available while individual fields carry their
/// sentinel because that one register failed CRC or timed out this cycle.
/// Replaced wholesale every poll; never partially mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilSnapshot {
    /// Volumetric soil moisture (%).  Sentinel −1.0.
    pub moisture_pct: f32,
    /// Soil temperature (°C).  Sentinel −100.0.
    pub temperature_c: f32,
    /// Electrical conductivity (mS/cm).  Sentinel −1.0.
    pub conductivity_ms_cm: f32,
    /// Soil pH, one decimal of precision.  Sentinel −1.0.
    pub ph: f32,
    /// Nitrogen content (mg/kg).  Sentinel 0.
    pub nitrogen_mg_kg: u16,
    /// Phosphorus content (mg/kg).  Sentinel 0.
    pub phosphorus_mg_kg: u16,
    /// Potassium content (mg/kg).  Sentinel 0.
    pub potassium_mg_kg: u16,
    /// How many of the 7 register reads succeeded in the producing cycle.
    pub valid_registers: u8,
    /// True iff at least 4 of the 7 register reads succeeded.
    pub available: bool,
}

impl Default for SoilSnapshot {
    /// The all-sentinel, unavailable snapshot — the state before the first
    /// poll and after a failed one.
    fn default() -> Self {
        Self {
            moisture_pct: SENTINEL_MOISTURE,
            temperature_c: SENTINEL_TEMPERATURE,
            conductivity_ms_cm: SENTINEL_CONDUCTIVITY,
            ph: SENTINEL_PH,
            nitrogen_mg_kg: 0,
            phosphorus_mg_kg: 0,
            potassium_mg_kg: 0,
            valid_registers: 0,
            available: false,
        }
    }
}

impl SoilSnapshot {
    /// The moisture value usable for irrigation decisions, if any.
    ///
    /// `None` when the snapshot is unavailable or the moisture register
    /// itself failed within an otherwise available snapshot.
    pub fn moisture_reading(&self) -> Option<f32> {
        if self.available && self.moisture_pct >= 0.0 {
            Some(self.moisture_pct)
        } else {
            None
        }
    }
}
