//! Relay bank for the pump, grow light, and mister.
//!
//! Each relay is an active-HIGH digital output behind an `embedded-hal`
//! [`OutputPin`], so the same driver runs on ESP-IDF `PinDriver`s and on
//! host-side test pins. All relays are forced LOW at construction.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator. Whether the pump may run is decided by
//! the task that drives it through the shared record.

use embedded_hal::digital::OutputPin;

use crate::app::state::Actuator;
use crate::error::ActuatorError;

pub struct RelayBank<P> {
    pump: P,
    light: P,
    mist: P,
    levels: [bool; 3],
}

impl<P: OutputPin> RelayBank<P> {
    pub fn new(mut pump: P, mut light: P, mut mist: P) -> Result<Self, ActuatorError> {
        for pin in [&mut pump, &mut light, &mut mist] {
            pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        }
        Ok(Self {
            pump,
            light,
            mist,
            levels: [false; 3],
        })
    }

    pub fn set(&mut self, actuator: Actuator, on: bool) -> Result<(), ActuatorError> {
        let pin = match actuator {
            Actuator::Pump => &mut self.pump,
            Actuator::Light => &mut self.light,
            Actuator::Mist => &mut self.mist,
        };
        let res = if on { pin.set_high() } else { pin.set_low() };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.levels[actuator as usize] = on;
        Ok(())
    }

    /// Last level successfully written to `actuator`.
    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.levels[actuator as usize]
    }
}
