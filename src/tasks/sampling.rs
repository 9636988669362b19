//! Sensor sampling loop (every 2 s by default).

use core::time::Duration;

use log::debug;

use crate::app::ports::{ActuatorPort, DisplayPort, SensorPort, TimePort};
use crate::app::state::SharedFarmState;
use crate::config::SystemConfig;
use crate::display::StatusView;

pub struct SamplingTask<S, D, O> {
    sensors: S,
    display: D,
    shared: SharedFarmState<O>,
    interval: Duration,
}

impl<S: SensorPort, D: DisplayPort, O: ActuatorPort> SamplingTask<S, D, O> {
    pub fn new(sensors: S, display: D, shared: SharedFarmState<O>, config: &SystemConfig) -> Self {
        Self {
            sensors,
            display,
            shared,
            interval: Duration::from_millis(u64::from(config.sample_interval_ms)),
        }
    }

    /// Read, publish into the shared record under one lock, then render.
    ///
    /// A NaN temperature or humidity keeps the previous value for that
    /// field. Soil and light are always written.
    pub fn step(&mut self) -> Duration {
        let reading = self.sensors.read_all();

        let state = self.shared.with_exclusive_access(|s| {
            if !reading.temperature.is_nan() {
                s.temperature = reading.temperature;
            }
            if !reading.air_humidity.is_nan() {
                s.air_humidity = reading.air_humidity;
            }
            s.soil_moisture = reading.soil_moisture;
            s.light_level = reading.light_level;
            *s
        });

        // Rendering happens after the lock is released.
        let view = StatusView::from_state(&state);
        if let Err(e) = self.display.render(&view) {
            debug!("SAMPLE | render skipped: {}", e);
        }

        self.interval
    }

    pub fn run<T: TimePort>(mut self, clock: &T) -> ! {
        loop {
            let delay = self.step();
            clock.sleep(delay);
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}
