//! SoilGuard Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single-threaded control loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  HardwareAdapter            LogEventSink  MonotonicClock │
//! │  (SoilProbe+PumpActuator)   (EventSink)   (Clock)        │
//! │  UartBus + DirPin over the RS-485 transceiver            │
//! │                                                          │
//! │  ───────────────── Port Trait Boundary ──────────────    │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │            AppService (pure logic)             │      │
//! │  │  probe cadence · irrigation FSM · safety       │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use log::info;

use soilguard::adapters::hardware::HardwareAdapter;
use soilguard::adapters::log_sink::LogEventSink;
use soilguard::adapters::rs485::{DirPin, UartBus};
use soilguard::adapters::time::MonotonicClock;
use soilguard::app::service::AppService;
use soilguard::config::SystemConfig;
use soilguard::drivers::{hw_init, relay::RelayDriver};
use soilguard::modbus::transport::{Clock, Rs485Transport};
use soilguard::pins;
use soilguard::sensors::npk::NpkProbe;

/// Status LED heartbeat period while the loop is alive.
const HEARTBEAT_MS: u64 = 1000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("SoilGuard v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        anyhow::bail!("invalid configuration: {e}");
    }
    let loop_sleep_ms = config.control_loop_interval_ms as u32;

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt; the
        // watchdog resets us after timeout.
        log::error!("peripheral init failed: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let bus = UartBus::install(config.npk_baud_rate)?;
    let dir = DirPin::new(pins::RS485_DE_RE_GPIO);
    let transport = Rs485Transport::new(
        bus,
        dir,
        MonotonicClock::new(),
        config.rs485_settle_ms,
        config.response_timeout_ms,
    );
    let probe = NpkProbe::new(transport, &config);
    let relay = RelayDriver::new(pins::PUMP_RELAY_GPIO, pins::PUMP_RELAY_ACTIVE_LOW);

    let mut hw = HardwareAdapter::new(probe, relay);
    let mut sink = LogEventSink::new();
    let mut clock = MonotonicClock::new();

    // ── 4. Application service ────────────────────────────────
    let mut service = AppService::new(config, clock.now_ms());
    service.start(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let mut led_on = false;
    let mut last_blink_ms = clock.now_ms();

    loop {
        let now = clock.now_ms();
        service.tick(now, &mut hw, &mut sink);

        if now.saturating_sub(last_blink_ms) >= HEARTBEAT_MS {
            last_blink_ms = now;
            led_on = !led_on;
            hw_init::gpio_write(pins::LED_STATUS_GPIO, led_on);
        }

        clock.delay_ms(loop_sleep_ms);
    }
}
