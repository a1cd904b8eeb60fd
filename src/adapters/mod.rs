//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to               |
//! |----------------|--------------------|---------------------------|
//! | `channel_sink` | EventSink          | embassy-sync channel      |
//! | `log_sink`     | EventSink          | Serial log output         |
//! | `loopback`     | CloudLink          | In-memory cloud stand-in  |
//! | `nvs`          | ConfigPort         | NVS / in-memory store     |
//! |                | StoragePort        |                           |
//! | `time`         | (none)             | ESP32 system timer        |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA          |

pub mod channel_sink;
pub mod log_sink;
pub mod loopback;
pub mod nvs;
pub mod time;
pub mod wifi;
