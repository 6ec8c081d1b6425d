//! GPIO / peripheral pin assignments for the SoilGuard main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// RS-485 soil probe (7-in-1 NPK sensor, Modbus RTU)
// ---------------------------------------------------------------------------

/// UART RX — RO (Receiver Output) from the MAX485 transceiver.
pub const RS485_RX_GPIO: i32 = 16;
/// UART TX — DI (Driver Input) to the MAX485 transceiver.
pub const RS485_TX_GPIO: i32 = 17;
/// Direction control: DE (Driver Enable) and RE (Receiver Enable) tied
/// together.  HIGH = transmit, LOW = receive.
pub const RS485_DE_RE_GPIO: i32 = 23;
/// UART peripheral number used for the RS-485 bus (UART2 on ESP32).
pub const RS485_UART_NUM: u8 = 2;

// ---------------------------------------------------------------------------
// Pump relay
// ---------------------------------------------------------------------------

/// Digital output driving the water-pump relay module (IN pin).
pub const PUMP_RELAY_GPIO: i32 = 27;
/// Most common relay boards energise on LOW; flip this if yours is
/// active-high.
pub const PUMP_RELAY_ACTIVE_LOW: bool = true;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// Built-in ESP32 LED used as a coarse health indicator.
pub const LED_STATUS_GPIO: i32 = 2;
