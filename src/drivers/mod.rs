//! Hardware drivers — dumb actuators and one-shot peripheral init.

pub mod hw_init;
pub mod relay;
