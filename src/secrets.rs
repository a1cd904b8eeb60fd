//! Deployment secrets.
//!
//! Replace every value below before flashing. These are the compiled-in
//! defaults for [`ThingConfig`](crate::config::ThingConfig); a config stored
//! in NVS takes precedence at boot.

/// WiFi network name.
pub const SSID: &str = "YourWiFiSSID";

/// WiFi passphrase (WPA2, 8-64 bytes, or empty for an open network).
pub const PASS: &str = "YourWiFiPass";

/// Thing ID from the cloud dashboard.
pub const THING_ID: &str = "your-thing-id";

/// Device login name from the cloud dashboard.
pub const DEVICE_LOGIN_NAME: &str = "your-device-login";

/// Device secret key from the cloud dashboard.
pub const DEVICE_KEY: &str = "your-device-key";
