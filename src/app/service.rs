//! Application service — orchestrates probe polling and irrigation
//! decisions on their respective cadences.
//!
//! ```text
//!  SoilProbePort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                    │        AppService        │
//!  PumpActuator ◀────│  poll · decide · safety  │
//!                    └──────────────────────────┘
//! ```
//!
//! [`tick`](AppService::tick) is called every control-loop iteration with
//! the current monotonic time and does three things:
//!
//! 1. polls the soil probe once per `npk_poll_interval_ms`;
//! 2. runs an irrigation decision + telemetry cycle once per
//!    `decision_interval_ms`;
//! 3. runs the runtime-ceiling safety check **every iteration**, so a
//!    stalled RS-485 bus degrades responsiveness but never pump safety.
//!
//! Single-threaded by design: the blocking probe poll stalls the loop for
//! up to seven transaction timeouts, which the coarse cadences absorb.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::irrigation::{IrrigationController, PumpEvent, StopReason};
use crate::sensors::SoilSnapshot;

use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, PumpActuator, SoilProbePort};

/// The application service.
pub struct AppService {
    config: SystemConfig,
    controller: IrrigationController,
    /// Latest snapshot, replaced wholesale after every probe poll.
    latest: SoilSnapshot,
    /// Moisture the most recent decision cycle used.
    moisture_used_pct: f32,
    last_poll_ms: u64,
    last_decision_ms: u64,
}

impl AppService {
    /// `now_ms` anchors both cadences and the controller's boot hold-off.
    pub fn new(config: SystemConfig, now_ms: u64) -> Self {
        let controller = IrrigationController::new(&config, now_ms);
        let moisture_used_pct = config.fallback_moisture_pct;
        Self {
            config,
            controller,
            latest: SoilSnapshot::default(),
            moisture_used_pct,
            last_poll_ms: now_ms,
            last_decision_ms: now_ms,
        }
    }

    /// Announce the start through the sink.
    pub fn start(&self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "service started: hold-off {}ms, thresholds {:.0}%/{:.0}%, ceiling {}s",
            self.config.boot_safe_delay_ms,
            self.config.moisture_start_pct,
            self.config.moisture_stop_pct,
            self.config.max_pump_secs
        );
    }

    /// Run one control-loop iteration.
    ///
    /// `hw` satisfies both [`SoilProbePort`] and [`PumpActuator`] — this
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SoilProbePort + PumpActuator),
        sink: &mut impl EventSink,
    ) {
        // 1. Probe cadence.
        if now_ms.saturating_sub(self.last_poll_ms) >= self.config.npk_poll_interval_ms {
            self.last_poll_ms = now_ms;
            match hw.poll() {
                Ok(snapshot) => self.latest = snapshot,
                Err(e) => {
                    // Reset behavior: the fresh unavailable snapshot
                    // replaces any previous good values.
                    self.latest = hw.snapshot();
                    warn!("probe poll unusable: {e}");
                    if let crate::error::ProbeError::InsufficientValidRegisters(valid) = e {
                        sink.emit(&AppEvent::ProbeUnavailable {
                            valid_registers: valid,
                        });
                    }
                }
            }
        }

        // 2. Decision cadence.
        if now_ms.saturating_sub(self.last_decision_ms) >= self.config.decision_interval_ms {
            self.last_decision_ms = now_ms;

            self.moisture_used_pct = self
                .latest
                .moisture_reading()
                .unwrap_or(self.config.fallback_moisture_pct);

            let events = self
                .controller
                .evaluate(self.moisture_used_pct, now_ms, hw);
            for event in &events {
                emit_pump_event(sink, *event);
            }

            sink.emit(&AppEvent::Telemetry(self.build_telemetry(now_ms)));
        }

        // 3. Safety — every iteration, independent of sensor health.
        if let Some(event) = self.controller.check_safety(now_ms, hw) {
            emit_pump_event(sink, event);
        }
    }

    // ── External commands (MQTT/web layers call these) ────────

    /// Manual pump command from an external layer.
    pub fn command_pump(
        &mut self,
        on: bool,
        now_ms: u64,
        hw: &mut impl PumpActuator,
        sink: &mut impl EventSink,
    ) {
        let event = if on {
            self.controller.start(now_ms, hw)
        } else {
            self.controller.stop(now_ms, hw, StopReason::External)
        };
        if let Some(e) = event {
            emit_pump_event(sink, e);
        }
    }

    /// Let an external averaging/fallback moisture source drive the same
    /// debounce counter.
    pub fn set_consecutive_dry(&mut self, count: u32) {
        self.controller.set_consecutive_dry(count);
    }

    // ── Read-only export surface ──────────────────────────────

    pub fn latest_snapshot(&self) -> SoilSnapshot {
        self.latest
    }

    pub fn controller(&self) -> &IrrigationController {
        &self.controller
    }

    /// Build the telemetry record the excluded web/MQTT/LCD layers consume.
    pub fn build_telemetry(&self, now_ms: u64) -> TelemetryData {
        TelemetryData {
            soil: self.latest,
            moisture_used_pct: self.moisture_used_pct,
            pump_active: self.controller.is_active(),
            pump_run_secs: self.controller.run_secs(now_ms),
            total_watering_secs: self.controller.total_watering_secs(),
            watering_count: self.controller.watering_count(),
            consecutive_dry: self.controller.consecutive_dry(),
        }
    }
}

fn emit_pump_event(sink: &mut impl EventSink, event: PumpEvent) {
    match event {
        PumpEvent::Started { count } => sink.emit(&AppEvent::PumpStarted { count }),
        PumpEvent::Stopped {
            reason,
            run_secs,
            total_secs,
        } => sink.emit(&AppEvent::PumpStopped {
            reason,
            run_secs,
            total_secs,
        }),
    }
}
