//! Port traits: the hexagonal boundary between the task loops and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Task loop (domain)
//! ```
//!
//! Driven adapters (sensors, relays, display, broker, link monitor, clock)
//! implement these traits. The task loops in [`crate::tasks`] consume them
//! via generics, so the domain never touches hardware directly and every
//! loop runs on the host against mocks.

use core::time::Duration;

use crate::app::state::Actuator;
use crate::display::StatusView;
use crate::error::{ActuatorError, CommsError};
use crate::sensors::SensorReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the sampling task calls this once per cycle.
pub trait SensorPort {
    /// Read every sensor. A failed DHT22 read yields NaN in the
    /// temperature / humidity fields rather than an error.
    fn read_all(&mut self) -> SensorReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the three relay outputs.
///
/// Only [`SharedFarmState`](crate::app::state::SharedFarmState) calls this,
/// under its lock, so the output and the recorded state change together.
/// Implementations must not block.
pub trait ActuatorPort {
    fn set_output(&mut self, actuator: Actuator, on: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    fn render(&mut self, view: &StatusView) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Link health port
// ───────────────────────────────────────────────────────────────

/// Polled by the failsafe once per tick.
pub trait LinkPort {
    /// `true` while both Wi-Fi and the broker session are up.
    fn is_link_up(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Broker port (telemetry out, commands in)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe session with the message broker.
///
/// Inbound messages on subscribed topics are not returned from here:
/// adapters push them into the [`CommandQueue`](crate::app::commands::CommandQueue)
/// they were built with.
pub trait BrokerPort {
    /// Open a session. Blocks at most for the transport's own timeout.
    fn connect(&mut self) -> Result<(), CommsError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    /// Pump the transport's event loop once. `Err` means the session dropped.
    fn service(&mut self) -> Result<(), CommsError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

pub trait TimePort {
    /// Milliseconds since boot (monotonic).
    fn uptime_ms(&self) -> u64;

    /// Suspend the calling task.
    fn sleep(&self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`DisplayPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// Display did not acknowledge on the bus.
    NotResponding,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotResponding => write!(f, "display not responding"),
        }
    }
}
