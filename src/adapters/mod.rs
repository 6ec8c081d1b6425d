//! Adapters — implementations of the port traits over real peripherals
//! (and the log sink).  Everything target-specific is cfg-gated inside so
//! the module tree builds on the host.

pub mod hardware;
pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod rs485;
pub mod time;
