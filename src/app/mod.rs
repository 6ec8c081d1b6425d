//! Application layer — port traits, outbound events, and the service that
//! orchestrates the soil probe and irrigation controller at their cadences.

pub mod events;
pub mod ports;
pub mod service;
