//! SoilGuard firmware library.
//!
//! Automated soil-monitoring irrigation controller: an RS-485 Modbus RTU
//! master polls a 7-in-1 NPK soil probe, and a debounced, hysteretic state
//! machine with a hard runtime ceiling drives the water-pump relay.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod modbus;
pub mod sensors;

pub mod pins;

// ESPidf-only implementations are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
