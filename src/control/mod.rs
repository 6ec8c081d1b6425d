//! Control subsystem — irrigation decision logic.

pub mod irrigation;
