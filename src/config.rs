//! System configuration parameters
//!
//! All tunable parameters for the farm node: broker identity, task
//! cadences, failsafe thresholds, and the gateway's local-mode rules.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Identifier stamped on every telemetry snapshot
    pub device_id: String<32>,

    // --- Network ---
    pub wifi_ssid: String<32>,
    /// Empty for open networks
    pub wifi_password: String<64>,
    /// `mqtt://host:port`
    pub broker_url: String<64>,
    pub client_id: String<32>,
    pub telemetry_topic: String<64>,
    pub command_topic: String<64>,

    // --- Timing ---
    /// Sensor sampling period (milliseconds)
    pub sample_interval_ms: u32,
    /// Telemetry publish period (milliseconds)
    pub publish_interval_ms: u32,
    /// Wait after a failed broker connect (milliseconds)
    pub reconnect_backoff_ms: u32,
    /// Telemetry task iteration period while connected (milliseconds)
    pub command_poll_interval_ms: u32,
    /// Failsafe link-check period (milliseconds)
    pub failsafe_tick_ms: u32,

    // --- Failsafe ---
    /// Consecutive offline ticks tolerated before evaluating the soil
    pub outage_threshold_ticks: u32,
    /// Soil moisture (%) below which the failsafe waters
    pub dry_soil_percent: u8,
    /// Pump hold per failsafe cycle (seconds)
    pub irrigation_secs: u32,
    /// Quiet period after a failsafe cycle (seconds)
    pub cooldown_secs: u32,

    // --- Gateway local mode ---
    pub gateway_soil_dry_percent: u8,
    pub gateway_light_dark_percent: u8,
}

fn fixed<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    // Defaults are compile-time constants that fit their capacity.
    let _ = out.push_str(s);
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_id: fixed("ESP32_WOKWI_01"),

            // Network
            wifi_ssid: fixed("Wokwi-GUEST"),
            wifi_password: String::new(),
            broker_url: fixed("mqtt://broker.hivemq.com:1883"),
            client_id: fixed("ESP32_SmartFarm_K19"),
            telemetry_topic: fixed("k19/doan_tot_nghiep/project_xalach/sensor"),
            command_topic: fixed("k19/doan_tot_nghiep/project_xalach/control"),

            // Timing
            sample_interval_ms: 2000,
            publish_interval_ms: 5000,
            reconnect_backoff_ms: 5000,
            command_poll_interval_ms: 100,
            failsafe_tick_ms: 1000,

            // Failsafe
            outage_threshold_ticks: 60,
            dry_soil_percent: 35,
            irrigation_secs: 30,
            cooldown_secs: 300,

            // Gateway
            gateway_soil_dry_percent: 30,
            gateway_light_dark_percent: 40,
        }
    }
}

impl SystemConfig {
    /// Reject values that would stall a task loop or never trigger.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0
            || self.publish_interval_ms == 0
            || self.command_poll_interval_ms == 0
            || self.failsafe_tick_ms == 0
        {
            return Err(ConfigError::ValidationFailed("task interval must be non-zero"));
        }
        if self.reconnect_backoff_ms == 0 {
            return Err(ConfigError::ValidationFailed("reconnect backoff must be non-zero"));
        }
        if self.irrigation_secs == 0 {
            return Err(ConfigError::ValidationFailed("irrigation duration must be non-zero"));
        }
        if self.dry_soil_percent > 100
            || self.gateway_soil_dry_percent > 100
            || self.gateway_light_dark_percent > 100
        {
            return Err(ConfigError::ValidationFailed("percentage threshold above 100"));
        }
        if self.telemetry_topic.is_empty() || self.command_topic.is_empty() {
            return Err(ConfigError::ValidationFailed("topic must not be empty"));
        }
        if self.telemetry_topic == self.command_topic {
            return Err(ConfigError::ValidationFailed("telemetry and command topics must differ"));
        }
        if self.broker_url.is_empty() || self.device_id.is_empty() {
            return Err(ConfigError::ValidationFailed("broker url and device id required"));
        }
        Ok(())
    }
}
