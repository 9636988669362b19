//! Shared environmental / actuator record.
//!
//! One [`SharedFarmState`] is built in `main()` before any task starts and a
//! clone of the handle is moved into each task. Every read and write goes
//! through a single mutex:
//!
//! - [`SharedFarmState::with_exclusive_access`] runs a closure against the
//!   record. The closure cannot leak references past the lock.
//! - [`SharedFarmState::drive`] writes a relay output and the matching
//!   actuator field in one critical section, so no reader ever sees the two
//!   disagree.
//!
//! Actuator fields are private to this module; the only way to change one
//! is to drive the output.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::ports::ActuatorPort;
use crate::error::ActuatorError;

// ── Actuators ─────────────────────────────────────────────────

/// The three relay-driven outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Pump,
    Light,
    Mist,
}

impl Actuator {
    pub const ALL: [Self; 3] = [Self::Pump, Self::Light, Self::Mist];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pump => "PUMP",
            Self::Light => "LIGHT",
            Self::Mist => "MIST",
        }
    }
}

/// Who drove an actuator last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveSource {
    /// Never driven since boot.
    #[default]
    Boot,
    /// Broker command.
    Remote,
    /// Autonomous watering cycle.
    Failsafe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorState {
    pub on: bool,
    pub source: DriveSource,
}

// ── Record ────────────────────────────────────────────────────

/// Last-known readings and actuator states. No history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FarmState {
    /// Air temperature (°C).
    pub temperature: f32,
    /// Relative air humidity (%).
    pub air_humidity: f32,
    /// Soil moisture (0–100 %).
    pub soil_moisture: u8,
    /// Ambient light (0–100 %, 0 = dark).
    pub light_level: u8,
    pump: ActuatorState,
    light: ActuatorState,
    mist: ActuatorState,
}

impl FarmState {
    pub fn actuator(&self, actuator: Actuator) -> ActuatorState {
        match actuator {
            Actuator::Pump => self.pump,
            Actuator::Light => self.light,
            Actuator::Mist => self.mist,
        }
    }

    pub fn pump_on(&self) -> bool {
        self.pump.on
    }

    pub fn light_on(&self) -> bool {
        self.light.on
    }

    pub fn mist_on(&self) -> bool {
        self.mist.on
    }

    fn actuator_mut(&mut self, actuator: Actuator) -> &mut ActuatorState {
        match actuator {
            Actuator::Pump => &mut self.pump,
            Actuator::Light => &mut self.light,
            Actuator::Mist => &mut self.mist,
        }
    }
}

// ── Shared handle ─────────────────────────────────────────────

struct Inner<O> {
    state: FarmState,
    outputs: O,
}

/// Cloneable handle to the single process-wide record plus the relay
/// outputs it mirrors.
pub struct SharedFarmState<O> {
    inner: Arc<Mutex<Inner<O>>>,
}

impl<O> Clone for SharedFarmState<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: ActuatorPort> SharedFarmState<O> {
    /// Build the record all-zero with every actuator OFF. The outputs are
    /// expected to already be in their OFF level.
    pub fn new(outputs: O) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: FarmState::default(),
                outputs,
            })),
        }
    }

    // A panic inside a closure must not wedge the other tasks: the record
    // holds plain values, so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner<O>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the record and return its result.
    ///
    /// The lock is released on every exit path. Do not block inside `f`.
    pub fn with_exclusive_access<R>(&self, f: impl FnOnce(&mut FarmState) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard.state)
    }

    /// Copy of the whole record.
    pub fn snapshot(&self) -> FarmState {
        self.with_exclusive_access(|s| *s)
    }

    /// Drive an output and record it, atomically with respect to every
    /// other accessor. On a GPIO failure the record is left unchanged.
    pub fn drive(
        &self,
        actuator: Actuator,
        on: bool,
        source: DriveSource,
    ) -> Result<(), ActuatorError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.outputs.set_output(actuator, on)?;
        *inner.state.actuator_mut(actuator) = ActuatorState { on, source };
        Ok(())
    }

    /// Switch `actuator` OFF only if `owner` is still the last driver.
    ///
    /// Returns `Ok(false)` when someone else drove it in the meantime and
    /// their state was left in place.
    pub fn release(&self, actuator: Actuator, owner: DriveSource) -> Result<bool, ActuatorError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.state.actuator(actuator).source != owner {
            return Ok(false);
        }
        inner.outputs.set_output(actuator, false)?;
        *inner.state.actuator_mut(actuator) = ActuatorState { on: false, source: owner };
        Ok(true)
    }

    /// Inspect the output adapter under the same lock as the record.
    pub fn inspect_outputs<R>(&self, f: impl FnOnce(&FarmState, &O) -> R) -> R {
        let guard = self.lock();
        f(&guard.state, &guard.outputs)
    }
}
