//! Inbound actuation commands.
//!
//! The broker adapter's callback runs on the transport's own thread. It
//! never touches [`SharedFarmState`](super::state::SharedFarmState): it
//! copies the raw payload into the [`CommandQueue`] and returns. The
//! telemetry task drains the queue once per iteration, in arrival order,
//! and parses each frame with [`ActuationCommand::parse`].
//!
//! ```text
//! ┌──────────────┐  raw frame   ┌──────────────────┐
//! │ MQTT callback│────────────▶│ telemetry task    │──▶ SharedFarmState
//! └──────────────┘ CommandQueue └──────────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use serde::{Deserialize, Serialize};

use super::state::Actuator;
use crate::error::CommandError;

// ── Command ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Device {
    Pump,
    Light,
    Mist,
}

impl From<Device> for Actuator {
    fn from(d: Device) -> Self {
        match d {
            Device::Pump => Actuator::Pump,
            Device::Light => Actuator::Light,
            Device::Mist => Actuator::Mist,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    On,
    Off,
}

/// `{"device": "PUMP"|"LIGHT"|"MIST", "status": "ON"|"OFF"}`
///
/// Extra keys are ignored. A missing key or an unknown value rejects the
/// whole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuationCommand {
    pub device: Device,
    pub status: Status,
}

impl ActuationCommand {
    pub fn parse(payload: &[u8]) -> Result<Self, CommandError> {
        serde_json::from_slice(payload).map_err(|_| CommandError::Malformed)
    }

    pub fn actuator(&self) -> Actuator {
        self.device.into()
    }

    pub fn turns_on(&self) -> bool {
        self.status == Status::On
    }
}

// ── Queue ─────────────────────────────────────────────────────

/// Largest inbound payload accepted from the broker.
pub const MAX_COMMAND_LEN: usize = 256;

/// Frames waiting for the telemetry task. Commands arrive at human pace;
/// eight covers a burst from a dashboard.
const QUEUE_DEPTH: usize = 8;

pub type CommandFrame = heapless::Vec<u8, MAX_COMMAND_LEN>;

/// Bounded multi-producer queue of raw command payloads.
pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, CommandFrame, QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Copy `payload` into the queue. Never blocks: oversize frames and
    /// frames arriving at a full queue are counted and discarded.
    pub fn push(&self, payload: &[u8]) -> Result<(), CommandError> {
        let Ok(frame) = CommandFrame::from_slice(payload) else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(CommandError::TooLong);
        };
        if self.channel.try_send(frame).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(CommandError::QueueFull);
        }
        Ok(())
    }

    pub fn pop(&self) -> Option<CommandFrame> {
        self.channel.try_receive().ok()
    }

    /// Frames discarded before reaching the telemetry task.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
