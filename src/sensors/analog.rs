//! Percentage-scaled analog sensors: capacitive soil probe and LDR divider.
//!
//! Both are read through ADC1 at 12 bits and mapped linearly onto
//! 0–100 %. The probe wiring puts "wet" and "bright" at the high end.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins;

static SIM_SOIL_ADC: AtomicU16 = AtomicU16::new(2048);
static SIM_LIGHT_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_soil_adc(raw: u16) {
    SIM_SOIL_ADC.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light_adc(raw: u16) {
    SIM_LIGHT_ADC.store(raw, Ordering::Relaxed);
}

pub const ADC_MAX: u16 = 4095;

/// Linear 0..=4095 → 0..=100, clamped.
pub fn adc_to_percent(raw: u16) -> u8 {
    (u32::from(raw.min(ADC_MAX)) * 100 / u32::from(ADC_MAX)) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogKind {
    Soil,
    Light,
}

pub struct AnalogSensor {
    kind: AnalogKind,
    channel: u32,
    /// Held across a failed conversion.
    last_percent: u8,
}

impl AnalogSensor {
    pub fn soil() -> Self {
        Self::new(AnalogKind::Soil, pins::SOIL_ADC_CHANNEL)
    }

    pub fn light() -> Self {
        Self::new(AnalogKind::Light, pins::LIGHT_ADC_CHANNEL)
    }

    fn new(kind: AnalogKind, channel: u32) -> Self {
        Self {
            kind,
            channel,
            last_percent: 0,
        }
    }

    pub fn read(&mut self) -> u8 {
        match self.read_adc() {
            Ok(raw) => self.last_percent = adc_to_percent(raw),
            Err(e) => log::debug!("{:?} ADC ch{}: {}", self.kind, self.channel, e),
        }
        self.last_percent
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        Ok(match self.kind {
            AnalogKind::Soil => SIM_SOIL_ADC.load(Ordering::Relaxed),
            AnalogKind::Light => SIM_LIGHT_ADC.load(Ordering::Relaxed),
        })
    }
}
