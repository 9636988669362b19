//! Log-based status display adapter.
//!
//! Implements [`DisplayPort`] by writing the three status lines to the
//! ESP-IDF logger (UART / USB-CDC). Used when no character LCD is fitted;
//! an I2C LCD adapter implements the same trait.
//!
//! Lines are logged at info only when they change, so a steady farm does
//! not flood the console every sampling cycle.

use log::{debug, info};

use crate::app::ports::{DisplayError, DisplayPort};
use crate::display::StatusView;

#[derive(Default)]
pub struct LogDisplay {
    last: Option<StatusView>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn last_view(&self) -> Option<&StatusView> {
        self.last.as_ref()
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, view: &StatusView) -> Result<(), DisplayError> {
        if self.last.as_ref() == Some(view) {
            debug!("VIEW | unchanged");
            return Ok(());
        }
        let [climate, ground, actuators] = view.lines();
        info!("VIEW | {} | {} | {}", climate, ground, actuators);
        self.last = Some(view.clone());
        Ok(())
    }
}
