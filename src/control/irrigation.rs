//! Irrigation decision state machine.
//!
//! ```text
//!  BOOTING ──[hold-off elapsed]──▶ IDLE ──[dry × N cycles]──▶ WATERING
//!                                    ▲                            │
//!                                    │  [moisture ≥ stop]         │
//!                                    └──[runtime ≥ ceiling]───────┘
//! ```
//!
//! Decisions are pure functions of the latest moisture sample, the current
//! phase and the clock — no retry or backoff concept.  Three safeguards:
//!
//! - **Boot hold-off**: no auto-start during the first seconds after power
//!   up, however dry the soil reads (sensors still settling, and a brown-out
//!   reboot loop must not cycle the pump).
//! - **Debounce**: a configurable number of consecutive dry readings before
//!   the pump starts, so a single noisy sample cannot trigger it.
//! - **Runtime ceiling**: a hard per-run cutoff evaluated every cycle —
//!   including the cycle the run starts — and additionally from the main
//!   loop via [`check_safety`](IrrigationController::check_safety), so a
//!   stalled sensor bus cannot postpone it.  It fires from the pump's own
//!   start timestamp regardless of sensor health.
//!
//! The controller owns the consecutive-dry counter exclusively; external
//! moisture sources drive the same debounce through
//! [`set_consecutive_dry`](IrrigationController::set_consecutive_dry).

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::PumpActuator;
use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Phase and events
// ---------------------------------------------------------------------------

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Post-boot hold-off: dry readings are logged but never acted on.
    Booting,
    /// Monitoring; pump off.
    Idle,
    /// Pump running.
    Watering,
}

/// Why a watering run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Moisture reached the stop threshold.
    TargetMoisture,
    /// The hard runtime ceiling fired.
    SafetyCutoff,
    /// An external caller stopped the pump directly.
    External,
}

/// Pump transitions produced by a decision cycle, for the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEvent {
    Started {
        /// Lifetime start count including this run.
        count: u32,
    },
    Stopped {
        reason: StopReason,
        run_secs: u64,
        total_secs: u64,
    },
}

/// At most a start and a stop can occur in one cycle (runtime ceiling of
/// zero, or an immediate target-moisture stop).
pub type PumpEvents = Vec<PumpEvent, 2>;

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Debounced, hysteretic pump controller with a hard runtime ceiling.
pub struct IrrigationController {
    phase: Phase,
    boot_at_ms: u64,

    // Tunables (fixed at construction)
    start_threshold_pct: f32,
    stop_threshold_pct: f32,
    required_consecutive_dry: u32,
    max_pump_ms: u64,
    boot_safe_delay_ms: u64,

    // Pump state — owned exclusively by this controller
    started_at_ms: u64,
    total_watering_secs: u64,
    watering_count: u32,
    consecutive_dry: u32,
}

impl IrrigationController {
    /// `now_ms` anchors the boot hold-off window.
    pub fn new(config: &SystemConfig, now_ms: u64) -> Self {
        Self {
            phase: Phase::Booting,
            boot_at_ms: now_ms,
            start_threshold_pct: config.moisture_start_pct,
            stop_threshold_pct: config.moisture_stop_pct,
            required_consecutive_dry: config.required_consecutive_dry,
            max_pump_ms: u64::from(config.max_pump_secs) * 1000,
            boot_safe_delay_ms: config.boot_safe_delay_ms,
            started_at_ms: 0,
            total_watering_secs: 0,
            watering_count: 0,
            consecutive_dry: 0,
        }
    }

    // ── Decision cycle ────────────────────────────────────────

    /// Run one decision cycle: boot check, start check, then stop checks.
    ///
    /// The runtime ceiling is evaluated even in the cycle a run starts, so
    /// no cycle can run unbounded regardless of how moisture behaves.
    pub fn evaluate(
        &mut self,
        moisture_pct: f32,
        now_ms: u64,
        pump: &mut impl PumpActuator,
    ) -> PumpEvents {
        let mut events = PumpEvents::new();

        // 1. Boot hold-off — purely time-based.
        if self.phase == Phase::Booting {
            if now_ms.saturating_sub(self.boot_at_ms) <= self.boot_safe_delay_ms {
                if moisture_pct <= self.start_threshold_pct {
                    info!("boot hold-off active, irrigation pending (moisture {moisture_pct:.1}%)");
                }
                return events;
            }
            self.phase = Phase::Idle;
            info!("boot hold-off complete, irrigation armed");
        }

        // 2. Start condition with debounce.
        if moisture_pct > self.start_threshold_pct {
            self.consecutive_dry = 0;
        } else if self.phase == Phase::Idle {
            self.consecutive_dry += 1;
            if self.consecutive_dry >= self.required_consecutive_dry {
                push(&mut events, self.start(now_ms, pump));
            } else {
                info!(
                    "moisture {moisture_pct:.1}% dry, waiting for {} more reading(s)",
                    self.required_consecutive_dry - self.consecutive_dry
                );
            }
        }

        // 3. Stop conditions: hysteresis target, then the ceiling.
        if self.phase == Phase::Watering && moisture_pct >= self.stop_threshold_pct {
            push(&mut events, self.stop(now_ms, pump, StopReason::TargetMoisture));
        }
        push(&mut events, self.check_safety(now_ms, pump));

        events
    }

    /// Runtime-ceiling check alone.  Called every loop iteration — between
    /// full decision cycles and regardless of sensor health — because the
    /// cutoff is time-based, not sample-based.
    pub fn check_safety(&mut self, now_ms: u64, pump: &mut impl PumpActuator) -> Option<PumpEvent> {
        if self.phase == Phase::Watering
            && now_ms.saturating_sub(self.started_at_ms) >= self.max_pump_ms
        {
            warn!("pump auto-stop: runtime ceiling reached");
            return self.stop(now_ms, pump, StopReason::SafetyCutoff);
        }
        None
    }

    // ── Direct actuation (also used by external command layers) ──

    /// Start a watering run now.  No-op if one is already active.
    pub fn start(&mut self, now_ms: u64, pump: &mut impl PumpActuator) -> Option<PumpEvent> {
        if self.phase == Phase::Watering {
            return None;
        }
        pump.set_active(true);
        self.phase = Phase::Watering;
        self.started_at_ms = now_ms;
        self.watering_count += 1;
        self.consecutive_dry = 0;
        info!("pump started (run #{})", self.watering_count);
        Some(PumpEvent::Started {
            count: self.watering_count,
        })
    }

    /// Stop the active watering run.  No-op if the pump is off.
    pub fn stop(
        &mut self,
        now_ms: u64,
        pump: &mut impl PumpActuator,
        reason: StopReason,
    ) -> Option<PumpEvent> {
        if self.phase != Phase::Watering {
            return None;
        }
        pump.set_active(false);
        let run_secs = now_ms.saturating_sub(self.started_at_ms) / 1000;
        self.total_watering_secs += run_secs;

        // An externally commanded run may end inside the hold-off window;
        // auto-start stays disarmed until the window has passed.
        self.phase = if now_ms.saturating_sub(self.boot_at_ms) <= self.boot_safe_delay_ms {
            Phase::Booting
        } else {
            Phase::Idle
        };

        info!(
            "pump stopped ({reason:?}): ran {run_secs}s, lifetime total {}s",
            self.total_watering_secs
        );
        Some(PumpEvent::Stopped {
            reason,
            run_secs,
            total_secs: self.total_watering_secs,
        })
    }

    // ── Read-only export surface ──────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Watering
    }

    /// Seconds the current run has been going; 0 when the pump is off.
    pub fn run_secs(&self, now_ms: u64) -> u64 {
        if self.is_active() {
            now_ms.saturating_sub(self.started_at_ms) / 1000
        } else {
            0
        }
    }

    /// Lifetime accumulated watering time (seconds).
    pub fn total_watering_secs(&self) -> u64 {
        self.total_watering_secs
    }

    /// Lifetime number of watering runs.
    pub fn watering_count(&self) -> u32 {
        self.watering_count
    }

    pub fn consecutive_dry(&self) -> u32 {
        self.consecutive_dry
    }

    /// Override the debounce counter — the hook for an external averaging
    /// or fallback moisture source.
    pub fn set_consecutive_dry(&mut self, count: u32) {
        self.consecutive_dry = count;
    }
}

fn push(events: &mut PumpEvents, event: Option<PumpEvent>) {
    if let Some(e) = event {
        // Capacity 2 covers the worst case (start + stop in one cycle).
        let _ = events.push(e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
