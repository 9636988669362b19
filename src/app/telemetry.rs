//! Outbound telemetry snapshot.
//!
//! Built from one locked read of the shared record, serialised to JSON,
//! published, then dropped. Field names match what the backend ingests.

use serde::{Deserialize, Serialize};

use super::state::FarmState;
use crate::error::CommsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub device_id: heapless::String<32>,
    pub temp: f32,
    pub hum_air: f32,
    pub hum_soil: u8,
    pub light: u8,
    pub pump_state: bool,
    pub light_state: bool,
    pub mist_state: bool,
}

impl TelemetrySnapshot {
    pub fn capture(device_id: &heapless::String<32>, state: &FarmState) -> Self {
        Self {
            device_id: device_id.clone(),
            temp: state.temperature,
            hum_air: state.air_humidity,
            hum_soil: state.soil_moisture,
            light: state.light_level,
            pump_state: state.pump_on(),
            light_state: state.light_on(),
            mist_state: state.mist_on(),
        }
    }

    /// JSON body for the telemetry topic.
    ///
    /// The record never holds NaN (failed DHT reads are skipped), so the
    /// float fields always encode as numbers.
    pub fn to_json(&self) -> Result<Vec<u8>, CommsError> {
        serde_json::to_vec(self).map_err(|_| CommsError::EncodeFailed)
    }
}
