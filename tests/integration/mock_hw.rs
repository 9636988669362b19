//! Mock adapters for integration tests.
//!
//! Outputs record every relay write so tests can assert on the full
//! command history without touching real GPIO. Handles that the test keeps
//! after moving a mock into a task (`Arc` flags, shared readings) let the
//! test steer the mock from outside.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use farmnode::app::commands::CommandQueue;
use farmnode::app::ports::{
    ActuatorPort, BrokerPort, DisplayError, DisplayPort, LinkPort, SensorPort, TimePort,
};
use farmnode::app::state::Actuator;
use farmnode::display::StatusView;
use farmnode::error::{ActuatorError, CommsError};
use farmnode::sensors::SensorReading;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCall {
    pub actuator: Actuator,
    pub on: bool,
}

// ── MockOutputs ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutputs {
    pub calls: Vec<ActuatorCall>,
    levels: [bool; 3],
    failing: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag that makes every subsequent write fail while set.
    pub fn fail_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.failing)
    }

    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.levels[actuator as usize]
    }

    pub fn writes_to(&self, actuator: Actuator) -> Vec<bool> {
        self.calls
            .iter()
            .filter(|c| c.actuator == actuator)
            .map(|c| c.on)
            .collect()
    }
}

impl ActuatorPort for MockOutputs {
    fn set_output(&mut self, actuator: Actuator, on: bool) -> Result<(), ActuatorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.calls.push(ActuatorCall { actuator, on });
        self.levels[actuator as usize] = on;
        Ok(())
    }
}

// ── MockSensors ───────────────────────────────────────────────

#[derive(Clone)]
pub struct MockSensors {
    reading: Arc<Mutex<SensorReading>>,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn new(reading: SensorReading) -> Self {
        Self {
            reading: Arc::new(Mutex::new(reading)),
        }
    }

    pub fn set(&self, reading: SensorReading) {
        *self.reading.lock().unwrap() = reading;
    }
}

impl SensorPort for MockSensors {
    fn read_all(&mut self) -> SensorReading {
        *self.reading.lock().unwrap()
    }
}

pub fn reading(temperature: f32, air_humidity: f32, soil: u8, light: u8) -> SensorReading {
    SensorReading {
        temperature,
        air_humidity,
        soil_moisture: soil,
        light_level: light,
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<StatusView>,
    pub not_responding: bool,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, view: &StatusView) -> Result<(), DisplayError> {
        if self.not_responding {
            return Err(DisplayError::NotResponding);
        }
        self.frames.push(view.clone());
        Ok(())
    }
}

// ── FakeLink ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeLink {
    up: Arc<AtomicBool>,
}

impl FakeLink {
    pub fn set(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }
}

impl LinkPort for FakeLink {
    fn is_link_up(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }
}

// ── MockBroker ────────────────────────────────────────────────

pub struct MockBroker {
    queue: Arc<CommandQueue>,
    pub reachable: bool,
    pub subscribe_ok: bool,
    /// Next `service()` reports the session dropped.
    pub drop_next: bool,
    pub connected: bool,
    pub connect_attempts: u32,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, Vec<u8>)>,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn new(queue: Arc<CommandQueue>) -> Self {
        Self {
            queue,
            reachable: true,
            subscribe_ok: true,
            drop_next: false,
            connected: false,
            connect_attempts: 0,
            subscriptions: Vec::new(),
            published: Vec::new(),
        }
    }

    /// Deliver a payload as the transport callback would.
    pub fn deliver(&self, payload: &[u8]) {
        let _ = self.queue.push(payload);
    }

    pub fn last_json(&self) -> serde_json::Value {
        let (_, body) = self.published.last().expect("nothing published");
        serde_json::from_slice(body).expect("telemetry is not JSON")
    }
}

impl BrokerPort for MockBroker {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.connect_attempts += 1;
        if !self.reachable {
            return Err(CommsError::MqttConnectFailed);
        }
        self.connected = true;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.subscribe_ok {
            self.connected = false;
            return Err(CommsError::MqttSubscribeFailed);
        }
        self.subscriptions.push(topic.to_owned());
        Ok(())
    }

    fn service(&mut self) -> Result<(), CommsError> {
        if self.drop_next {
            self.drop_next = false;
            self.connected = false;
            return Err(CommsError::MqttDisconnected);
        }
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::MqttPublishFailed);
        }
        self.published.push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }
}

// ── FakeClock ─────────────────────────────────────────────────

/// Virtual clock: `sleep` advances time instantly.
#[derive(Default)]
pub struct FakeClock {
    now_ms: Cell<u64>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ms.set(self.now_ms.get() + d.as_millis() as u64);
    }
}

impl TimePort for FakeClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
