//! Hardware adapters: bridge the drivers to the port traits.
//!
//! - [`SensorHub`] implements [`SensorPort`] for the sampling task.
//! - [`RelayBank`] implements [`ActuatorPort`] and is owned by the
//!   shared record, which is the only caller.
//!
//! Both compile on ESP-IDF and host; the drivers underneath are cfg-gated.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::app::state::Actuator;
use crate::drivers::relay::RelayBank;
use crate::error::ActuatorError;
use crate::sensors::{SensorHub, SensorReading};

impl SensorPort for SensorHub {
    fn read_all(&mut self) -> SensorReading {
        SensorHub::read_all(self)
    }
}

impl<P: OutputPin> ActuatorPort for RelayBank<P> {
    fn set_output(&mut self, actuator: Actuator, on: bool) -> Result<(), ActuatorError> {
        self.set(actuator, on)
    }
}
