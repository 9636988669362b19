//! Peer-to-peer node record.
//!
//! Sensor, control, and gateway nodes exchange one fixed 24-byte
//! little-endian record over the local broadcast link:
//!
//! ```text
//! offset  0   4      8        12        16     20       24
//!         ┌───┬──────┬────────┬─────────┬──────┬────────┐
//!         │id │ temp │hum_air │hum_soil │light │command │
//!         │i32│ f32  │  f32   │   i32   │ i32  │  i32   │
//!         └───┴──────┴────────┴─────────┴──────┴────────┘
//! ```
//!
//! Records with a wrong length, an unknown `id`, or an unknown `command`
//! are rejected so the receiver can ignore them.

use crate::app::commands::{ActuationCommand, Device, Status};
use crate::config::SystemConfig;
use crate::error::PeerError;

pub const RECORD_LEN: usize = 24;

// ── Roles and commands ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NodeRole {
    Sensor = 1,
    Control = 2,
    Gateway = 3,
}

impl TryFrom<i32> for NodeRole {
    type Error = PeerError;

    fn try_from(v: i32) -> Result<Self, PeerError> {
        match v {
            1 => Ok(Self::Sensor),
            2 => Ok(Self::Control),
            3 => Ok(Self::Gateway),
            other => Err(PeerError::UnknownRole(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PeerCommand {
    None = 0,
    PumpOn = 1,
    PumpOff = 2,
    MistOn = 3,
    MistOff = 4,
    LightOn = 5,
    LightOff = 6,
}

impl TryFrom<i32> for PeerCommand {
    type Error = PeerError;

    fn try_from(v: i32) -> Result<Self, PeerError> {
        Ok(match v {
            0 => Self::None,
            1 => Self::PumpOn,
            2 => Self::PumpOff,
            3 => Self::MistOn,
            4 => Self::MistOff,
            5 => Self::LightOn,
            6 => Self::LightOff,
            other => return Err(PeerError::UnknownCommand(other)),
        })
    }
}

impl From<ActuationCommand> for PeerCommand {
    fn from(cmd: ActuationCommand) -> Self {
        match (cmd.device, cmd.status) {
            (Device::Pump, Status::On) => Self::PumpOn,
            (Device::Pump, Status::Off) => Self::PumpOff,
            (Device::Mist, Status::On) => Self::MistOn,
            (Device::Mist, Status::Off) => Self::MistOff,
            (Device::Light, Status::On) => Self::LightOn,
            (Device::Light, Status::Off) => Self::LightOff,
        }
    }
}

impl PeerCommand {
    /// `None` for [`PeerCommand::None`], which carries no actuation.
    pub fn to_actuation(self) -> Option<ActuationCommand> {
        let (device, status) = match self {
            Self::None => return None,
            Self::PumpOn => (Device::Pump, Status::On),
            Self::PumpOff => (Device::Pump, Status::Off),
            Self::MistOn => (Device::Mist, Status::On),
            Self::MistOff => (Device::Mist, Status::Off),
            Self::LightOn => (Device::Light, Status::On),
            Self::LightOff => (Device::Light, Status::Off),
        };
        Some(ActuationCommand { device, status })
    }
}

// ── Record ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerRecord {
    pub role: NodeRole,
    pub temperature: f32,
    pub air_humidity: f32,
    pub soil_moisture: i32,
    pub light_level: i32,
    pub command: PeerCommand,
}

fn word(bytes: &[u8], offset: usize) -> [u8; 4] {
    let mut w = [0u8; 4];
    w.copy_from_slice(&bytes[offset..offset + 4]);
    w
}

impl PeerRecord {
    /// Command-only record as the gateway sends it; sensor fields are zero.
    pub fn command(role: NodeRole, command: PeerCommand) -> Self {
        Self {
            role,
            temperature: 0.0,
            air_humidity: 0.0,
            soil_moisture: 0,
            light_level: 0,
            command,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..4].copy_from_slice(&(self.role as i32).to_le_bytes());
        out[4..8].copy_from_slice(&self.temperature.to_le_bytes());
        out[8..12].copy_from_slice(&self.air_humidity.to_le_bytes());
        out[12..16].copy_from_slice(&self.soil_moisture.to_le_bytes());
        out[16..20].copy_from_slice(&self.light_level.to_le_bytes());
        out[20..24].copy_from_slice(&(self.command as i32).to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PeerError> {
        if bytes.len() != RECORD_LEN {
            return Err(PeerError::WrongLength(bytes.len()));
        }
        Ok(Self {
            role: NodeRole::try_from(i32::from_le_bytes(word(bytes, 0)))?,
            temperature: f32::from_le_bytes(word(bytes, 4)),
            air_humidity: f32::from_le_bytes(word(bytes, 8)),
            soil_moisture: i32::from_le_bytes(word(bytes, 12)),
            light_level: i32::from_le_bytes(word(bytes, 16)),
            command: PeerCommand::try_from(i32::from_le_bytes(word(bytes, 20)))?,
        })
    }
}

// ── Gateway local mode ────────────────────────────────────────

/// Threshold automation the gateway runs on each sensor record when it
/// has no broker. Commands are edge-triggered: one is emitted only when
/// the tracked relay state changes.
#[derive(Debug, Clone)]
pub struct GatewayRules {
    soil_dry_percent: i32,
    light_dark_percent: i32,
    pump_on: bool,
    light_on: bool,
}

impl GatewayRules {
    pub fn new(soil_dry_percent: u8, light_dark_percent: u8) -> Self {
        Self {
            soil_dry_percent: soil_dry_percent as i32,
            light_dark_percent: light_dark_percent as i32,
            pump_on: false,
            light_on: false,
        }
    }

    /// Thresholds from the configured gateway local mode.
    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.gateway_soil_dry_percent, config.gateway_light_dark_percent)
    }

    /// Records from anything but a sensor node produce no commands.
    pub fn evaluate(&mut self, record: &PeerRecord) -> heapless::Vec<PeerRecord, 2> {
        let mut out = heapless::Vec::new();
        if record.role != NodeRole::Sensor {
            return out;
        }

        let want_pump = record.soil_moisture < self.soil_dry_percent;
        if want_pump != self.pump_on {
            self.pump_on = want_pump;
            let cmd = if want_pump { PeerCommand::PumpOn } else { PeerCommand::PumpOff };
            let _ = out.push(PeerRecord::command(NodeRole::Gateway, cmd));
        }

        let want_light = record.light_level < self.light_dark_percent;
        if want_light != self.light_on {
            self.light_on = want_light;
            let cmd = if want_light { PeerCommand::LightOn } else { PeerCommand::LightOff };
            let _ = out.push(PeerRecord::command(NodeRole::Gateway, cmd));
        }

        out
    }
}
