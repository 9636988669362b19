//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                 |
//! |---------------|---------------------|-----------------------------|
//! | `hardware`    | SensorPort          | DHT22, ADC1 soil / LDR      |
//! |               | ActuatorPort        | Relay GPIOs                 |
//! | `link`        | LinkPort            | Wi-Fi + broker health flags |
//! | `log_display` | DisplayPort         | Serial log output           |
//! | `mqtt`        | BrokerPort          | ESP-IDF MQTT client         |
//! | `time`        | TimePort            | ESP32 system timer          |
//! | `wifi`        | ConnectivityPort    | ESP-IDF WiFi STA            |

pub mod hardware;
pub mod link;
pub mod log_display;
pub mod mqtt;
pub mod time;
pub mod wifi;
