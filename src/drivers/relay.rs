//! Water-pump relay driver.
//!
//! A dumb actuator: it maps "pump on/off" to the GPIO level the relay
//! module expects and remembers what it last wrote.  Debounce, hysteresis
//! and the runtime ceiling all live in the irrigation controller — never
//! here.
//!
//! Polarity is this driver's concern: most relay boards energise on LOW,
//! so "on" and "pin high" are not the same thing.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct RelayDriver {
    gpio: i32,
    active_low: bool,
    energised: bool,
}

impl RelayDriver {
    /// Construct and drive the relay to its OFF level immediately — the
    /// pin must never float at boot with a pump attached.
    pub fn new(gpio: i32, active_low: bool) -> Self {
        let relay = Self {
            gpio,
            active_low,
            energised: false,
        };
        hw_init::gpio_write(gpio, relay.level_for(false));
        relay
    }

    /// Energise or release the relay.
    pub fn set_energised(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, self.level_for(on));
        self.energised = on;
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    /// GPIO level for the requested relay state under this polarity.
    fn level_for(&self, on: bool) -> bool {
        on != self.active_low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_low_board_inverts_levels() {
        let relay = RelayDriver::new(27, true);
        assert!(relay.level_for(false), "off = pin high on active-low boards");
        assert!(!relay.level_for(true), "on = pin low on active-low boards");
    }

    #[test]
    fn active_high_board_is_direct() {
        let relay = RelayDriver::new(27, false);
        assert!(!relay.level_for(false));
        assert!(relay.level_for(true));
    }

    #[test]
    fn starts_released() {
        let relay = RelayDriver::new(27, true);
        assert!(!relay.is_energised());
    }

    #[test]
    fn tracks_commanded_state() {
        let mut relay = RelayDriver::new(27, true);
        relay.set_energised(true);
        assert!(relay.is_energised());
        relay.set_energised(false);
        assert!(!relay.is_energised());
    }
}
