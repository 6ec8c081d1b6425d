//! System configuration parameters
//!
//! All tunable parameters for the SoilGuard system.  Defaults match the
//! field-proven values from the deployed units; individual installations
//! override them before constructing the service.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Irrigation thresholds ---
    /// Soil moisture (%) at or below which a reading counts as "dry".
    pub moisture_start_pct: f32,
    /// Soil moisture (%) at or above which watering stops.  Kept well above
    /// the start threshold for hysteresis.
    pub moisture_stop_pct: f32,
    /// Consecutive dry readings required before the pump starts.
    pub required_consecutive_dry: u32,
    /// Hard ceiling on a single watering run (seconds).  Unconditional.
    pub max_pump_secs: u32,
    /// Hold-off after boot during which the pump never auto-starts (ms).
    pub boot_safe_delay_ms: u64,
    /// Moisture (%) substituted when the probe snapshot is unusable.
    /// Defaults above the stop threshold so a dead bus never waters.
    pub fallback_moisture_pct: f32,

    // --- RS-485 soil probe ---
    /// Modbus slave address of the NPK probe.
    pub npk_slave_addr: u8,
    /// UART baud rate for the RS-485 bus (probe is fixed at 4800 8N1).
    pub npk_baud_rate: u32,
    /// Transceiver direction-switch settle delay (ms).
    pub rs485_settle_ms: u32,
    /// Per-transaction response deadline (ms), measured from the start of
    /// the receive wait.
    pub response_timeout_ms: u32,
    /// Recovery gap between consecutive register reads (ms) — this probe
    /// class drops requests issued back-to-back.
    pub inter_read_delay_ms: u32,

    // --- Timing ---
    /// Soil probe poll cadence (ms).
    pub npk_poll_interval_ms: u64,
    /// Irrigation decision / telemetry cadence (ms).
    pub decision_interval_ms: u64,
    /// Idle sleep per control-loop iteration (ms).
    pub control_loop_interval_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Irrigation
            moisture_start_pct: 30.0,
            moisture_stop_pct: 70.0,
            required_consecutive_dry: 2,
            max_pump_secs: 60,
            boot_safe_delay_ms: 15_000,
            fallback_moisture_pct: 100.0,

            // RS-485 probe
            npk_slave_addr: 0x01,
            npk_baud_rate: 4800,
            rs485_settle_ms: 10,
            response_timeout_ms: 1000,
            inter_read_delay_ms: 50,

            // Timing
            npk_poll_interval_ms: 1000,
            decision_interval_ms: 2000,
            control_loop_interval_ms: 10,
        }
    }
}

impl SystemConfig {
    /// Range-check the parameters that would make the controller unsafe or
    /// the bus timing nonsensical.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.moisture_start_pct >= self.moisture_stop_pct {
            return Err(Error::Config("start threshold must be below stop threshold"));
        }
        if self.max_pump_secs == 0 {
            return Err(Error::Config("max_pump_secs must be non-zero"));
        }
        if self.required_consecutive_dry == 0 {
            return Err(Error::Config("required_consecutive_dry must be non-zero"));
        }
        if self.response_timeout_ms == 0 {
            return Err(Error::Config("response_timeout_ms must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.moisture_start_pct < c.moisture_stop_pct);
        assert!(c.max_pump_secs > 0);
        assert!(c.boot_safe_delay_ms > 0);
        assert!(c.npk_poll_interval_ms >= c.response_timeout_ms as u64);
    }

    #[test]
    fn hysteresis_invariant() {
        let c = SystemConfig::default();
        assert!(
            c.moisture_start_pct < c.moisture_stop_pct,
            "stop threshold must sit above start to prevent relay chatter"
        );
    }

    #[test]
    fn fallback_never_reads_as_dry() {
        let c = SystemConfig::default();
        assert!(
            c.fallback_moisture_pct > c.moisture_start_pct,
            "a dead probe bus must not be able to start the pump"
        );
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let c = SystemConfig {
            moisture_start_pct: 80.0,
            moisture_stop_pct: 70.0,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.moisture_start_pct - c2.moisture_start_pct).abs() < 0.001);
        assert_eq!(c.max_pump_secs, c2.max_pump_secs);
        assert_eq!(c.npk_slave_addr, c2.npk_slave_addr);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.required_consecutive_dry, c2.required_consecutive_dry);
        assert!((c.moisture_stop_pct - c2.moisture_stop_pct).abs() < 0.001);
    }
}
