//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a [`SensorReading`] each
//! sampling cycle for the sampling task to write into the shared record.

pub mod analog;
pub mod dht;

use log::debug;

use analog::AnalogSensor;
use dht::Dht22Sensor;

/// One sampling cycle's worth of raw inputs.
///
/// `temperature` and `air_humidity` are NaN when the DHT22 read failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f32,
    pub air_humidity: f32,
    pub soil_moisture: u8,
    pub light_level: u8,
}

/// Aggregates all sensor drivers and produces a unified reading.
pub struct SensorHub {
    pub climate: Dht22Sensor,
    pub soil: AnalogSensor,
    pub light: AnalogSensor,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(climate: Dht22Sensor, soil: AnalogSensor, light: AnalogSensor) -> Self {
        Self { climate, soil, light }
    }

    /// Read every sensor. A DHT22 failure is not retried here; the next
    /// cycle simply tries again.
    pub fn read_all(&mut self) -> SensorReading {
        let (temperature, air_humidity) = match self.climate.read() {
            Ok(c) => (c.temperature_c, c.humidity_pct),
            Err(e) => {
                debug!("DHT22: {}, skipping this cycle", e);
                (f32::NAN, f32::NAN)
            }
        };

        SensorReading {
            temperature,
            air_humidity,
            soil_moisture: self.soil.read(),
            light_level: self.light.read(),
        }
    }
}
