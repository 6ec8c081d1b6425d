//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them — log to serial, publish over MQTT, render
//! on the dashboard.  This module owns no encoding; `TelemetryData` merely
//! derives `Serialize` so downstream layers can.

use serde::Serialize;

use crate::control::irrigation::StopReason;
use crate::sensors::SoilSnapshot;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started; irrigation is in its boot hold-off.
    Started,

    /// Periodic telemetry snapshot, one per decision cycle.
    Telemetry(TelemetryData),

    /// A watering run began (carries the lifetime start count).
    PumpStarted { count: u32 },

    /// A watering run ended.
    PumpStopped {
        reason: StopReason,
        run_secs: u64,
        total_secs: u64,
    },

    /// A poll cycle yielded too few valid registers to trust.
    ProbeUnavailable { valid_registers: u8 },
}

/// A point-in-time telemetry record: the read-only surface consumed by the
/// web/MQTT/LCD layers.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TelemetryData {
    /// Latest soil snapshot, sentinels and all.
    pub soil: SoilSnapshot,
    /// Moisture value the decision actually used (snapshot or fallback).
    pub moisture_used_pct: f32,
    pub pump_active: bool,
    /// Seconds the current run has been going; 0 when off.
    pub pump_run_secs: u64,
    /// Lifetime accumulated watering seconds.
    pub total_watering_secs: u64,
    /// Lifetime watering run count.
    pub watering_count: u32,
    /// Current debounce counter value.
    pub consecutive_dry: u32,
}
