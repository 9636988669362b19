//! DHT22 air temperature / humidity sensor on a single open-drain line.
//!
//! The DHT22 drops a read now and then (missed start pulse, bad checksum).
//! Callers treat that as a transient fault: [`Dht22Sensor::read`] returns
//! an error and the sensor hub reports NaN for both fields.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the protocol via `dht-sensor` on an
//! `InputOutput` pin driver with the ROM busy-wait delay.
//! On host/test: reads from static atomics; a NaN injected there reads
//! as a timeout.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::SensorError;

static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41C8_0000); // 25.0
static SIM_HUM_BITS: AtomicU32 = AtomicU32::new(0x4248_0000); // 50.0

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_dht(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUM_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Dht22Sensor {
    #[cfg(target_os = "espidf")]
    pin: esp_idf_hal::gpio::PinDriver<
        'static,
        esp_idf_hal::gpio::AnyIOPin,
        esp_idf_hal::gpio::InputOutput,
    >,
    #[cfg(target_os = "espidf")]
    delay: esp_idf_hal::delay::Ets,
}

impl Dht22Sensor {
    #[cfg(target_os = "espidf")]
    pub fn new(pin: esp_idf_hal::gpio::AnyIOPin) -> anyhow::Result<Self> {
        use esp_idf_hal::gpio::{PinDriver, Pull};

        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;
        Ok(Self {
            pin,
            delay: esp_idf_hal::delay::Ets,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        use dht_sensor::{dht22, DhtError, DhtReading};

        // Idle level before the start pulse.
        self.pin.set_high().map_err(|_| SensorError::DhtTimeout)?;
        match dht22::Reading::read(&mut self.delay, &mut self.pin) {
            Ok(r) => Ok(ClimateReading {
                temperature_c: r.temperature,
                humidity_pct: r.relative_humidity,
            }),
            Err(DhtError::ChecksumMismatch) => Err(SensorError::DhtChecksum),
            Err(_) => Err(SensorError::DhtTimeout),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let temperature_c = f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed));
        let humidity_pct = f32::from_bits(SIM_HUM_BITS.load(Ordering::Relaxed));
        if temperature_c.is_nan() || humidity_pct.is_nan() {
            return Err(SensorError::DhtTimeout);
        }
        Ok(ClimateReading { temperature_c, humidity_pct })
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for Dht22Sensor {
    fn default() -> Self {
        Self::new()
    }
}
