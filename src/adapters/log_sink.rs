//! Event sink that writes every application event to the `log` facade.
//!
//! The default sink when no MQTT/web layer is attached; those layers wrap
//! this with their own fan-out.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("event: service started"),
            AppEvent::Telemetry(t) => info!(
                "telemetry: moisture={:.1}% (used {:.1}%) pump={} run={}s total={}s runs={} dry={}",
                t.soil.moisture_pct,
                t.moisture_used_pct,
                t.pump_active,
                t.pump_run_secs,
                t.total_watering_secs,
                t.watering_count,
                t.consecutive_dry
            ),
            AppEvent::PumpStarted { count } => info!("event: pump started (run #{count})"),
            AppEvent::PumpStopped {
                reason,
                run_secs,
                total_secs,
            } => info!("event: pump stopped ({reason:?}) after {run_secs}s, total {total_secs}s"),
            AppEvent::ProbeUnavailable { valid_registers } => {
                warn!("event: probe unavailable ({valid_registers}/7 valid)");
            }
        }
    }
}
