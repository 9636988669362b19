//! MQTT broker adapter.
//!
//! Implements [`BrokerPort`]. Inbound messages on the command topic are
//! copied into the shared [`CommandQueue`]; the session state is mirrored
//! into the broker half of [`LinkStatus`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` from `esp_idf_svc::mqtt`.
//!   The client runs its own FreeRTOS task and reconnects internally; the
//!   event callback is the only place the session flag changes.
//! - **all other targets**: an in-process broker whose reachability is
//!   injectable, for host-side runs of the firmware loops.

use std::sync::Arc;
#[cfg(not(target_os = "espidf"))]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
use log::debug;
use log::{info, warn};

use super::link::LinkStatus;
use crate::app::commands::CommandQueue;
use crate::app::ports::BrokerPort;
use crate::config::SystemConfig;
use crate::error::CommsError;

#[cfg(not(target_os = "espidf"))]
static SIM_BROKER_REACHABLE: AtomicBool = AtomicBool::new(true);

/// Make the simulated broker (un)reachable.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_broker_reachable(reachable: bool) {
    SIM_BROKER_REACHABLE.store(reachable, Ordering::Relaxed);
}

/// How long `connect()` waits for the CONNACK.
#[cfg(target_os = "espidf")]
const CONNECT_TIMEOUT_MS: u32 = 10_000;
#[cfg(target_os = "espidf")]
const CONNECT_POLL_MS: u32 = 50;

pub struct MqttAdapter {
    url: heapless::String<64>,
    client_id: heapless::String<32>,
    command_topic: heapless::String<64>,
    queue: Arc<CommandQueue>,
    link: LinkStatus,
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
}

impl MqttAdapter {
    pub fn new(config: &SystemConfig, queue: Arc<CommandQueue>, link: LinkStatus) -> Self {
        Self {
            url: config.broker_url.clone(),
            client_id: config.client_id.clone(),
            command_topic: config.command_topic.clone(),
            queue,
            link,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim_connected: false,
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::hal::delay::FreeRtos;
        use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};

        if self.client.is_none() {
            let conf = MqttClientConfiguration {
                client_id: Some(self.client_id.as_str()),
                ..Default::default()
            };
            let queue = Arc::clone(&self.queue);
            let link = self.link.clone();
            let command_topic = self.command_topic.clone();

            let client = EspMqttClient::new_cb(&self.url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => link.set_broker(true),
                    EventPayload::Disconnected => link.set_broker(false),
                    EventPayload::Received { topic, data, .. } => {
                        if topic.is_some_and(|t| t != command_topic.as_str()) {
                            return;
                        }
                        if let Err(e) = queue.push(data) {
                            warn!("MQTT | inbound dropped: {}", e);
                        }
                    }
                    _ => {}
                }
            })
            .map_err(|e| {
                warn!("MQTT | client init: {:?}", e);
                CommsError::MqttConnectFailed
            })?;
            self.client = Some(client);
        }

        let mut waited = 0;
        while !self.link.broker_up() {
            if waited >= CONNECT_TIMEOUT_MS {
                return Err(CommsError::MqttConnectFailed);
            }
            FreeRtos::delay_ms(CONNECT_POLL_MS);
            waited += CONNECT_POLL_MS;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if !SIM_BROKER_REACHABLE.load(Ordering::Relaxed) {
            return Err(CommsError::MqttConnectFailed);
        }
        self.sim_connected = true;
        self.link.set_broker(true);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::QoS;

        let client = self.client.as_mut().ok_or(CommsError::MqttDisconnected)?;
        client
            .subscribe(topic, QoS::AtLeastOnce)
            .map(|_| ())
            .map_err(|_| CommsError::MqttSubscribeFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.sim_connected {
            return Err(CommsError::MqttSubscribeFailed);
        }
        debug!("MQTT(sim): subscribed '{}'", topic);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_service(&mut self) -> Result<(), CommsError> {
        // The client task pumps the socket; only the session flag matters here.
        if self.link.broker_up() {
            Ok(())
        } else {
            Err(CommsError::MqttDisconnected)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_service(&mut self) -> Result<(), CommsError> {
        if !SIM_BROKER_REACHABLE.load(Ordering::Relaxed) {
            self.sim_connected = false;
            self.link.set_broker(false);
        }
        if self.sim_connected {
            Ok(())
        } else {
            Err(CommsError::MqttDisconnected)
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::QoS;

        let client = self.client.as_mut().ok_or(CommsError::MqttDisconnected)?;
        // enqueue() hands the message to the outbox without blocking.
        client
            .enqueue(topic, QoS::AtLeastOnce, false, payload)
            .map(|_| ())
            .map_err(|_| CommsError::MqttPublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.sim_connected {
            return Err(CommsError::MqttDisconnected);
        }
        debug!(
            "MQTT(sim): {} <- {}",
            topic,
            core::str::from_utf8(payload).unwrap_or("<binary>")
        );
        Ok(())
    }

    /// Deliver a message as if the broker had pushed it on the command topic.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_deliver(&self, payload: &[u8]) {
        if let Err(e) = self.queue.push(payload) {
            warn!("MQTT(sim) | inbound dropped: {}", e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// BrokerPort
// ───────────────────────────────────────────────────────────────

impl BrokerPort for MqttAdapter {
    fn connect(&mut self) -> Result<(), CommsError> {
        info!("MQTT | connecting to {} as '{}'", self.url, self.client_id);
        self.platform_connect()
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        self.platform_subscribe(topic)
    }

    fn service(&mut self) -> Result<(), CommsError> {
        self.platform_service()
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        self.platform_publish(topic, payload)
    }
}
