//! Device configuration
//!
//! Network credentials, cloud identity and sync tuning.
//! Defaults come from [`crate::secrets`]; values can be overridden via NVS.

use serde::{Deserialize, Serialize};

use crate::adapters::wifi;
use crate::app::ports::ConfigError;
use crate::secrets;

/// WiFi network name, at most 32 bytes.
pub type Ssid = heapless::String<32>;
/// WiFi passphrase, at most 64 bytes.
pub type Passphrase = heapless::String<64>;
/// Cloud identifiers (thing id, login name, key), at most 64 bytes each.
pub type CloudId = heapless::String<64>;

/// Credentials handed to the connection handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: Ssid,
    pub password: Passphrase,
}

/// Identity used to authenticate this device to the cloud service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub thing_id: CloudId,
    pub device_login_name: CloudId,
    pub device_key: CloudId,
}

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingConfig {
    // --- Network ---
    pub wifi: WifiCredentials,

    // --- Cloud ---
    pub identity: DeviceIdentity,

    // --- Sync ---
    /// Cooperative poll cycle period (milliseconds)
    pub poll_interval_ms: u32,
    /// Minimum change (°C) before `temperature` is republished
    pub temperature_min_delta: f32,
}

impl Default for ThingConfig {
    fn default() -> Self {
        Self {
            wifi: WifiCredentials {
                ssid: bounded(secrets::SSID),
                password: bounded(secrets::PASS),
            },
            identity: DeviceIdentity {
                thing_id: bounded(secrets::THING_ID),
                device_login_name: bounded(secrets::DEVICE_LOGIN_NAME),
                device_key: bounded(secrets::DEVICE_KEY),
            },
            poll_interval_ms: 500,
            temperature_min_delta: 0.0,
        }
    }
}

impl ThingConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Same rules the connection handler applies, so a stored config
        // never fails later at boot.
        wifi::validate_ssid(&self.wifi.ssid).map_err(|_| {
            ConfigError::ValidationFailed("wifi.ssid must be 1-32 printable ASCII bytes")
        })?;
        wifi::validate_password(&self.wifi.password).map_err(|_| {
            ConfigError::ValidationFailed("wifi.password must be empty or 8-64 bytes")
        })?;
        if self.identity.thing_id.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "identity.thing_id must not be empty",
            ));
        }
        if self.identity.device_login_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "identity.device_login_name must not be empty",
            ));
        }
        if !(50..=60_000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 50–60000",
            ));
        }
        if !self.temperature_min_delta.is_finite() || self.temperature_min_delta < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "temperature_min_delta must be a finite value >= 0",
            ));
        }
        Ok(())
    }

    /// `true` while any credential still carries its placeholder from
    /// [`crate::secrets`].
    pub fn has_placeholders(&self) -> bool {
        self.wifi.ssid == secrets::SSID
            || self.wifi.password == secrets::PASS
            || self.identity.thing_id == secrets::THING_ID
            || self.identity.device_login_name == secrets::DEVICE_LOGIN_NAME
            || self.identity.device_key == secrets::DEVICE_KEY
    }
}

/// Copy `s` into a fixed-capacity string, truncating at a char boundary.
pub fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = ThingConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.identity.thing_id.as_str(), "your-thing-id");
        assert_eq!(c.wifi.ssid.as_str(), "YourWiFiSSID");
    }

    #[test]
    fn default_config_reports_placeholders() {
        let mut c = ThingConfig::default();
        assert!(c.has_placeholders());

        c.wifi.ssid = bounded("HomeNet");
        c.wifi.password = bounded("hunter2hunter2");
        c.identity.thing_id = bounded("0b7e-thing");
        c.identity.device_login_name = bounded("dev-login");
        c.identity.device_key = bounded("s3cr3t");
        assert!(!c.has_placeholders());
    }

    #[test]
    fn rejects_short_password() {
        let mut c = ThingConfig::default();
        c.wifi.password = bounded("short");
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn rejects_ssid_the_handler_would_refuse() {
        let mut c = ThingConfig::default();
        c.wifi.ssid = bounded("café");
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
        assert!(crate::adapters::wifi::WifiConnectionHandler::from_credentials(&c.wifi).is_err());
    }

    #[test]
    fn rejects_negative_delta() {
        let c = ThingConfig {
            temperature_min_delta: -0.5,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn bounded_truncates() {
        let s: heapless::String<4> = bounded("abcdef");
        assert_eq!(s.as_str(), "abcd");
    }

    #[test]
    fn serde_roundtrip() {
        let c = ThingConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: ThingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.identity, c2.identity);
        assert_eq!(c.poll_interval_ms, c2.poll_interval_ms);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = ThingConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: ThingConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.wifi, c2.wifi);
        assert!((c.temperature_min_delta - c2.temperature_min_delta).abs() < 0.001);
    }
}
