//! ESP-IDF UART adapter for the RS-485 bus.
//!
//! Implements [`SerialBus`] over the raw IDF UART driver and exposes the
//! MAX485 DE/RE direction pin as an `embedded-hal` output.  The probe
//! speaks 4800 8N1; flow control stays off because the transceiver has
//! none.

use core::convert::Infallible;
use core::ptr;

use esp_idf_svc::sys::*;

use crate::drivers::hw_init;
use crate::modbus::transport::SerialBus;
use crate::pins;

/// Driver-side RX ring buffer.  A response is 7 bytes; 256 comfortably
/// absorbs any line noise between `clear_input` calls.
const UART_RX_BUF_BYTES: i32 = 256;

/// Ticks granted to `uart_wait_tx_done` — several frame times at 4800
/// baud, so a hung FIFO surfaces as an error instead of a deadlock.
const TX_DRAIN_TICKS: u32 = 100;

pub struct UartBus {
    port: uart_port_t,
}

impl UartBus {
    /// Install the UART driver on [`pins::RS485_UART_NUM`] (8N1).
    pub fn install(baud_rate: u32) -> Result<Self, EspError> {
        let port = uart_port_t::from(pins::RS485_UART_NUM);
        let cfg = uart_config_t {
            baud_rate: baud_rate as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: called once from main(); this struct is the sole owner
        // of the port afterwards.
        unsafe {
            esp!(uart_driver_install(
                port,
                UART_RX_BUF_BYTES,
                0,
                0,
                ptr::null_mut(),
                0
            ))?;
            esp!(uart_param_config(port, &cfg))?;
            esp!(uart_set_pin(
                port,
                pins::RS485_TX_GPIO,
                pins::RS485_RX_GPIO,
                -1,
                -1
            ))?;
        }

        log::info!("rs485: UART{port} installed at {baud_rate} baud 8N1");
        Ok(Self { port })
    }
}

impl SerialBus for UartBus {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        // Zero-tick timeout: return whatever the driver has buffered.
        let n =
            unsafe { uart_read_bytes(self.port, buf.as_mut_ptr().cast(), buf.len() as u32, 0) };
        if n < 0 {
            return Err(EspError::from_infallible::<ESP_FAIL>());
        }
        Ok(n as usize)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), EspError> {
        let n = unsafe { uart_write_bytes(self.port, data.as_ptr().cast(), data.len()) };
        if n < 0 || n as usize != data.len() {
            return Err(EspError::from_infallible::<ESP_FAIL>());
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), EspError> {
        esp!(unsafe { uart_wait_tx_done(self.port, TX_DRAIN_TICKS) })
    }

    fn clear_input(&mut self) -> Result<(), EspError> {
        esp!(unsafe { uart_flush_input(self.port) })
    }
}

/// DE/RE direction pin.  HIGH = transmit, LOW = receive; starts in
/// receive so the bus is never driven while idle.
pub struct DirPin {
    gpio: i32,
}

impl DirPin {
    pub fn new(gpio: i32) -> Self {
        hw_init::gpio_write(gpio, false);
        Self { gpio }
    }
}

impl embedded_hal::digital::ErrorType for DirPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for DirPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.gpio, true);
        Ok(())
    }
}
