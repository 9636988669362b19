//! Autonomous watering when the remote link has been down too long.
//!
//! ```text
//!              link up: counter = 0
//!             ┌────┐
//!             ▼    │ link down: counter += 1
//!        ┌──────────┐  counter > threshold  ┌────────────┐
//!   ┌──▶ │Monitoring│ ────────────────────▶ │ Evaluating │
//!   │    └──────────┘ ◀──────────────────── └─────┬──────┘
//!   │                    soil >= dry              │ soil < dry
//!   │    ┌──────────┐   pump OFF after hold ┌─────▼──────┐
//!   └─── │ Cooldown │ ◀──────────────────── │  Watering  │
//!        └──────────┘                       └────────────┘
//! ```
//!
//! The outage counter survives Cooldown: if the link is still down when
//! monitoring resumes, the very next tick re-evaluates the soil.
//!
//! At the end of the hold the pump is released only if the failsafe is
//! still its last driver. A remote command that arrived mid-cycle stands.

use core::time::Duration;

use log::{error, info, warn};

use crate::app::ports::{ActuatorPort, LinkPort, TimePort};
use crate::app::state::{Actuator, DriveSource, SharedFarmState};
use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailsafePhase {
    Monitoring,
    Evaluating,
    Watering { pump_started: bool },
    Cooldown,
}

pub struct FailsafeTask<L, O> {
    link: L,
    shared: SharedFarmState<O>,
    phase: FailsafePhase,
    /// Consecutive ticks without connectivity.
    outage_ticks: u32,
    outage_threshold: u32,
    dry_soil_percent: u8,
    tick: Duration,
    irrigation: Duration,
    cooldown: Duration,
    cycles: u32,
}

impl<L: LinkPort, O: ActuatorPort> FailsafeTask<L, O> {
    pub fn new(link: L, shared: SharedFarmState<O>, config: &SystemConfig) -> Self {
        Self {
            link,
            shared,
            phase: FailsafePhase::Monitoring,
            outage_ticks: 0,
            outage_threshold: config.outage_threshold_ticks,
            dry_soil_percent: config.dry_soil_percent,
            tick: Duration::from_millis(u64::from(config.failsafe_tick_ms)),
            irrigation: Duration::from_secs(u64::from(config.irrigation_secs)),
            cooldown: Duration::from_secs(u64::from(config.cooldown_secs)),
            cycles: 0,
        }
    }

    fn enter(&mut self, next: FailsafePhase) {
        info!("FAILSAFE | {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Advance the state machine once. Returns the delay before the next
    /// step; zero means "continue immediately".
    pub fn step(&mut self) -> Duration {
        match self.phase {
            FailsafePhase::Monitoring => {
                if self.link.is_link_up() {
                    if self.outage_ticks > 0 {
                        info!("FAILSAFE | link restored after {} ticks", self.outage_ticks);
                    }
                    self.outage_ticks = 0;
                    return self.tick;
                }
                self.outage_ticks = self.outage_ticks.saturating_add(1);
                if self.outage_ticks > self.outage_threshold {
                    self.enter(FailsafePhase::Evaluating);
                    return Duration::ZERO;
                }
                self.tick
            }

            FailsafePhase::Evaluating => {
                let soil = self.shared.with_exclusive_access(|s| s.soil_moisture);
                if soil >= self.dry_soil_percent {
                    self.enter(FailsafePhase::Monitoring);
                    return self.tick;
                }
                warn!(
                    "FAILSAFE | offline {} ticks, soil {}% < {}%, watering for {} s",
                    self.outage_ticks,
                    soil,
                    self.dry_soil_percent,
                    self.irrigation.as_secs()
                );
                self.enter(FailsafePhase::Watering { pump_started: false });
                Duration::ZERO
            }

            FailsafePhase::Watering { pump_started: false } => {
                match self.shared.drive(Actuator::Pump, true, DriveSource::Failsafe) {
                    Ok(()) => {
                        self.cycles = self.cycles.wrapping_add(1);
                        self.phase = FailsafePhase::Watering { pump_started: true };
                        self.irrigation
                    }
                    Err(e) => {
                        error!("FAILSAFE | pump ON failed: {}", e);
                        self.enter(FailsafePhase::Monitoring);
                        self.tick
                    }
                }
            }

            FailsafePhase::Watering { pump_started: true } => {
                match self.shared.release(Actuator::Pump, DriveSource::Failsafe) {
                    Ok(true) => info!("FAILSAFE | watering done, pump OFF"),
                    Ok(false) => info!("FAILSAFE | pump was re-driven remotely, leaving it"),
                    Err(e) => {
                        // Retry every tick until the relay lets go.
                        error!("FAILSAFE | pump OFF failed: {}", e);
                        return self.tick;
                    }
                }
                self.enter(FailsafePhase::Cooldown);
                self.cooldown
            }

            FailsafePhase::Cooldown => {
                self.enter(FailsafePhase::Monitoring);
                Duration::ZERO
            }
        }
    }

    pub fn run<T: TimePort>(mut self, clock: &T) -> ! {
        loop {
            let delay = self.step();
            if !delay.is_zero() {
                clock.sleep(delay);
            }
        }
    }

    // ── Introspection ─────────────────────────────────────────

    pub fn phase(&self) -> FailsafePhase {
        self.phase
    }

    pub fn outage_ticks(&self) -> u32 {
        self.outage_ticks
    }

    /// Watering cycles started since boot.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}
