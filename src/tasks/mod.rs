//! The three long-running control loops.
//!
//! ```text
//!                 ┌────────────────────┐
//!  SensorPort ──▶ │   SamplingTask     │ ──▶ DisplayPort
//!                 └─────────┬──────────┘
//!                           │ writes sensor fields
//!                 ┌─────────▼──────────┐
//!                 │  SharedFarmState   │ ◀── one mutex
//!                 └──▲─────────────▲───┘
//!      drive(Remote) │             │ drive / release(Failsafe)
//!  ┌─────────────────┴───┐   ┌─────┴──────────────┐
//!  │ TelemetryCommandTask│   │   FailsafeTask     │ ◀── LinkPort
//!  └──▲──────────────────┘   └────────────────────┘
//!     │ BrokerPort + CommandQueue
//! ```
//!
//! No task calls or waits on another. Each exposes `step()`, which does
//! one iteration and returns how long to sleep before the next, and
//! `run()`, which loops `step()` forever against a [`TimePort`]. Tests
//! drive `step()` directly with simulated time.
//!
//! [`TimePort`]: crate::app::ports::TimePort

pub mod failsafe;
pub mod sampling;
pub mod telemetry;

pub use failsafe::{FailsafePhase, FailsafeTask};
pub use sampling::SamplingTask;
pub use telemetry::{LinkState, TelemetryCommandTask};
