//! Application core: pure domain types, zero I/O.
//!
//! The shared farm record, the inbound command and outbound telemetry
//! formats, and the **port traits** in [`ports`] that keep every task
//! loop testable without real peripherals.

pub mod commands;
pub mod ports;
pub mod state;
pub mod telemetry;
