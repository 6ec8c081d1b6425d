//! Port traits — the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (the RS-485 probe, the pump relay, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole service runs against mocks on the host.

use crate::error::ProbeError;
use crate::sensors::SoilSnapshot;

// ───────────────────────────────────────────────────────────────
// Soil probe port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to run a probe poll cycle.
pub trait SoilProbePort {
    /// Run one full poll cycle and return the fresh snapshot.
    fn poll(&mut self) -> Result<SoilSnapshot, ProbeError>;

    /// The snapshot from the most recent poll (all-sentinel before any).
    fn snapshot(&self) -> SoilSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Pump actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the irrigation controller commands the pump through
/// this.  Relay polarity is the implementing driver's concern — `true`
/// always means "water flows".
pub trait PumpActuator {
    fn set_active(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, MQTT,
/// web dashboard, LCD).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
