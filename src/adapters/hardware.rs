//! Hardware adapter — binds the soil probe and pump relay to the port
//! traits the [`AppService`](crate::app::service::AppService) consumes.
//!
//! Generic over the serial bus, direction pin and clock so the exact same
//! adapter wraps the real UART on target and scripted mocks on the host.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{PumpActuator, SoilProbePort};
use crate::drivers::relay::RelayDriver;
use crate::error::ProbeError;
use crate::modbus::transport::{Clock, SerialBus};
use crate::sensors::npk::NpkProbe;
use crate::sensors::SoilSnapshot;

pub struct HardwareAdapter<B, P, C> {
    probe: NpkProbe<B, P, C>,
    relay: RelayDriver,
}

impl<B, P, C> HardwareAdapter<B, P, C>
where
    B: SerialBus,
    P: OutputPin,
    C: Clock,
{
    pub fn new(probe: NpkProbe<B, P, C>, relay: RelayDriver) -> Self {
        Self { probe, relay }
    }

    pub fn relay(&self) -> &RelayDriver {
        &self.relay
    }
}

impl<B, P, C> SoilProbePort for HardwareAdapter<B, P, C>
where
    B: SerialBus,
    P: OutputPin,
    C: Clock,
{
    fn poll(&mut self) -> Result<SoilSnapshot, ProbeError> {
        self.probe.poll()
    }

    fn snapshot(&self) -> SoilSnapshot {
        self.probe.snapshot()
    }
}

impl<B, P, C> PumpActuator for HardwareAdapter<B, P, C>
where
    B: SerialBus,
    P: OutputPin,
    C: Clock,
{
    fn set_active(&mut self, on: bool) {
        self.relay.set_energised(on);
    }
}
