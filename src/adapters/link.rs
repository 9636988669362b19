//! Link health flags shared between the network adapters and the failsafe.
//!
//! The Wi-Fi adapter owns the Wi-Fi half, the MQTT event callback owns the
//! broker half. The failsafe only reads. Plain atomics: a flag may be one
//! tick stale, which the outage counter tolerates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app::ports::LinkPort;

#[derive(Debug, Clone, Default)]
pub struct LinkStatus {
    wifi: Arc<AtomicBool>,
    broker: Arc<AtomicBool>,
}

impl LinkStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_wifi(&self, up: bool) {
        self.wifi.store(up, Ordering::Release);
    }

    pub fn set_broker(&self, up: bool) {
        self.broker.store(up, Ordering::Release);
    }

    pub fn wifi_up(&self) -> bool {
        self.wifi.load(Ordering::Acquire)
    }

    pub fn broker_up(&self) -> bool {
        self.broker.load(Ordering::Acquire)
    }
}

impl LinkPort for LinkStatus {
    fn is_link_up(&self) -> bool {
        self.wifi_up() && self.broker_up()
    }
}
