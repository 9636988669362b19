//! Broker session, telemetry publishing, and remote command application.
//!
//! Link state machine:
//!
//! ```text
//!            connect + subscribe ok
//!  Disconnected ─────────────────────▶ Connected
//!       ▲  │ fail: sleep backoff          │
//!       │  └──────────┘                   │ service() reports a drop
//!       └─────────────────────────────────┘ (reconnect on the next step)
//! ```
//!
//! Publishing runs on the task's own clock regardless of link state; a
//! publish that falls due while Disconnected is skipped, never queued.

use core::time::Duration;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::app::commands::{ActuationCommand, CommandQueue};
use crate::app::ports::{ActuatorPort, BrokerPort, TimePort};
use crate::app::state::{DriveSource, SharedFarmState};
use crate::app::telemetry::TelemetrySnapshot;
use crate::config::SystemConfig;
use crate::error::{CommsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

pub struct TelemetryCommandTask<B, O> {
    broker: B,
    shared: SharedFarmState<O>,
    queue: Arc<CommandQueue>,
    device_id: heapless::String<32>,
    telemetry_topic: heapless::String<64>,
    command_topic: heapless::String<64>,
    link: LinkState,
    publish_interval_ms: u64,
    next_publish_ms: u64,
    backoff: Duration,
    poll: Duration,
    published: u32,
    rejected_commands: u32,
}

impl<B: BrokerPort, O: ActuatorPort> TelemetryCommandTask<B, O> {
    pub fn new(
        broker: B,
        shared: SharedFarmState<O>,
        queue: Arc<CommandQueue>,
        config: &SystemConfig,
    ) -> Self {
        Self {
            broker,
            shared,
            queue,
            device_id: config.device_id.clone(),
            telemetry_topic: config.telemetry_topic.clone(),
            command_topic: config.command_topic.clone(),
            link: LinkState::Disconnected,
            publish_interval_ms: u64::from(config.publish_interval_ms),
            next_publish_ms: 0,
            backoff: Duration::from_millis(u64::from(config.reconnect_backoff_ms)),
            poll: Duration::from_millis(u64::from(config.command_poll_interval_ms)),
            published: 0,
            rejected_commands: 0,
        }
    }

    /// One iteration at monotonic time `now_ms`. Returns the delay before
    /// the next iteration.
    pub fn step(&mut self, now_ms: u64) -> Duration {
        let mut delay = self.poll;

        match self.link {
            LinkState::Disconnected => match self.establish() {
                Ok(()) => {
                    info!("MQTT | connected, subscribed to '{}'", self.command_topic);
                    self.link = LinkState::Connected;
                }
                Err(e) => {
                    warn!("MQTT | {}, retrying in {} ms", e, self.backoff.as_millis());
                    delay = self.backoff;
                }
            },
            LinkState::Connected => {
                if let Err(e) = self.broker.service() {
                    warn!("MQTT | link lost: {}", e);
                    self.link = LinkState::Disconnected;
                    delay = Duration::ZERO;
                }
            }
        }

        self.apply_pending_commands();

        if now_ms >= self.next_publish_ms {
            self.next_publish_ms = now_ms + self.publish_interval_ms;
            self.publish_snapshot();
        }

        delay
    }

    pub fn run<T: TimePort>(mut self, clock: &T) -> ! {
        loop {
            let delay = self.step(clock.uptime_ms());
            clock.sleep(delay);
        }
    }

    fn establish(&mut self) -> core::result::Result<(), CommsError> {
        self.broker.connect()?;
        self.broker.subscribe(&self.command_topic)
    }

    // ── Commands ──────────────────────────────────────────────

    fn apply_pending_commands(&mut self) {
        while let Some(frame) = self.queue.pop() {
            match self.apply(&frame) {
                Ok(cmd) => info!(
                    "CMD | {} -> {}",
                    cmd.actuator().name(),
                    if cmd.turns_on() { "ON" } else { "OFF" }
                ),
                Err(e) => {
                    self.rejected_commands = self.rejected_commands.wrapping_add(1);
                    warn!("CMD | dropped: {}", e);
                }
            }
        }
    }

    fn apply(&self, frame: &[u8]) -> Result<ActuationCommand> {
        let cmd = ActuationCommand::parse(frame)?;
        self.shared.drive(cmd.actuator(), cmd.turns_on(), DriveSource::Remote)?;
        Ok(cmd)
    }

    // ── Telemetry ─────────────────────────────────────────────

    fn publish_snapshot(&mut self) {
        if self.link != LinkState::Connected {
            debug!("MQTT | offline, telemetry skipped");
            return;
        }

        let snapshot = self
            .shared
            .with_exclusive_access(|s| TelemetrySnapshot::capture(&self.device_id, s));

        let result = snapshot
            .to_json()
            .and_then(|body| self.broker.publish(&self.telemetry_topic, &body));
        match result {
            Ok(()) => self.published = self.published.wrapping_add(1),
            Err(e) => warn!("MQTT | telemetry not sent: {}", e),
        }
    }

    // ── Introspection ─────────────────────────────────────────

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn published(&self) -> u32 {
        self.published
    }

    /// Commands parsed or applied unsuccessfully since boot.
    pub fn rejected_commands(&self) -> u32 {
        self.rejected_commands
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }
}
