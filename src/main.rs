//! Farm node firmware: main entry point.
//!
//! Hexagonal architecture with three core-pinned control loops sharing one
//! mutex-guarded record.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SensorHub      RelayBank      LogDisplay     Esp32Time        │
//! │  (SensorPort)   (ActuatorPort) (DisplayPort)  (TimePort)       │
//! │  MqttAdapter    LinkStatus     WifiAdapter                     │
//! │  (BrokerPort)   (LinkPort)     (Connectivity, main thread)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  SamplingTask · TelemetryCommandTask · FailsafeTask    │    │
//! │  │              └──── SharedFarmState ────┘               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::{IOPin as _, OutputPin as _, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use farmnode::adapters::link::LinkStatus;
use farmnode::adapters::log_display::LogDisplay;
use farmnode::adapters::mqtt::MqttAdapter;
use farmnode::adapters::time::Esp32TimeAdapter;
use farmnode::adapters::wifi::{ConnectivityPort, WifiAdapter};
use farmnode::app::commands::CommandQueue;
use farmnode::app::ports::TimePort;
use farmnode::app::state::SharedFarmState;
use farmnode::config::SystemConfig;
use farmnode::drivers::hw_init;
use farmnode::drivers::relay::RelayBank;
use farmnode::drivers::task_pin::{FAILSAFE_TASK, SAMPLING_TASK, TELEMETRY_TASK, spawn_on_core};
use farmnode::sensors::SensorHub;
use farmnode::sensors::analog::AnalogSensor;
use farmnode::sensors::dht::Dht22Sensor;
use farmnode::tasks::{FailsafeTask, SamplingTask, TelemetryCommandTask};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FarmNode v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().map_err(|e| anyhow!("config: {e}"))?;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(|e| anyhow!("HAL init: {e}"))?;
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let pins = peripherals.pins;

    let relays = RelayBank::new(
        PinDriver::output(pins.gpio18.downgrade_output())?,
        PinDriver::output(pins.gpio19.downgrade_output())?,
        PinDriver::output(pins.gpio5.downgrade_output())?,
    )
    .map_err(|e| anyhow!("relay init: {e}"))?;
    let shared = SharedFarmState::new(relays);

    let hub = SensorHub::new(
        Dht22Sensor::new(pins.gpio4.downgrade())?,
        AnalogSensor::soil(),
        AnalogSensor::light(),
    );

    // ── 4. Network ────────────────────────────────────────────
    let link = LinkStatus::new();
    let queue = Arc::new(CommandQueue::new());

    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs, link.clone())?;
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
        .map_err(|e| anyhow!("WiFi credentials: {e}"))?;
    if let Err(e) = wifi.connect() {
        // The failsafe covers the farm until the link comes up.
        warn!("WiFi: initial connect failed ({}), retrying from main loop", e);
    }

    let mqtt = MqttAdapter::new(&config, Arc::clone(&queue), link.clone());

    // ── 5. Tasks ──────────────────────────────────────────────
    let clock = Esp32TimeAdapter::new();

    let sampling = SamplingTask::new(hub, LogDisplay::new(), shared.clone(), &config);
    let telemetry = TelemetryCommandTask::new(mqtt, shared.clone(), queue, &config);
    let failsafe = FailsafeTask::new(link, shared, &config);

    spawn_on_core(SAMPLING_TASK, move || {
        sampling.run(&clock);
    })?;
    spawn_on_core(TELEMETRY_TASK, move || {
        telemetry.run(&clock);
    })?;
    spawn_on_core(FAILSAFE_TASK, move || {
        failsafe.run(&clock);
    })?;

    info!("System ready. Main thread keeps WiFi up.");

    // ── 6. WiFi upkeep (1 Hz) ─────────────────────────────────
    loop {
        wifi.poll();
        clock.sleep(Duration::from_secs(1));
    }
}
