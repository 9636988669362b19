//! Local status view for the 20x4 character display.
//!
//! Formatting lives here so the sampling task and the tests see exactly
//! what the panel shows; the adapter only pushes lines to the glass.

use core::fmt::Write;

use heapless::String;

use crate::app::state::FarmState;

pub const COLUMNS: usize = 20;

pub type Line = String<COLUMNS>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub climate: Line,
    pub ground: Line,
    pub actuators: Line,
}

fn on_off(on: bool) -> &'static str {
    if on { "ON " } else { "OFF" }
}

impl StatusView {
    pub fn from_state(state: &FarmState) -> Self {
        let mut climate = Line::new();
        let mut ground = Line::new();
        let mut actuators = Line::new();

        // Overlong values are clipped by the fixed capacity.
        let _ = write!(climate, "T:{:.1} H:{:.0}%", state.temperature, state.air_humidity);
        let _ = write!(ground, "Soil:{}% Light:{}%", state.soil_moisture, state.light_level);
        let _ = write!(
            actuators,
            "P:{} L:{} M:{}",
            on_off(state.pump_on()),
            on_off(state.light_on()),
            on_off(state.mist_on()),
        );

        Self { climate, ground, actuators }
    }

    pub fn lines(&self) -> [&str; 3] {
        [self.climate.as_str(), self.ground.as_str(), self.actuators.as_str()]
    }
}
