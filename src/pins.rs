//! GPIO / peripheral pin assignments for the farm node board (ESP32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 air temperature / humidity, single-wire open-drain.
pub const DHT22_GPIO: i32 = 4;

/// Capacitive soil moisture probe. ADC1 channel 6 (GPIO 34).
pub const SOIL_ADC_GPIO: i32 = 34;
pub const SOIL_ADC_CHANNEL: u32 = 6;

/// LDR light divider. ADC1 channel 7 (GPIO 35).
pub const LIGHT_ADC_GPIO: i32 = 35;
pub const LIGHT_ADC_CHANNEL: u32 = 7;

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH, start LOW)
// ---------------------------------------------------------------------------

pub const PUMP_RELAY_GPIO: i32 = 18;
pub const LIGHT_RELAY_GPIO: i32 = 19;
pub const MIST_RELAY_GPIO: i32 = 5;
