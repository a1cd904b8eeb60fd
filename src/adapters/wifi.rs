//! WiFi station-mode connection handler.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity. Owns the network credentials for the life of the
//! application.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF WiFi driver.
//! - **all other targets**: simulation backend for host-side tests, with
//!   hooks to inject connect failures and link loss.
//!
//! ## Reconnection
//!
//! A lost or failed connection is retried on every [`poll`](ConnectivityPort::poll).
//! Pacing is left to the caller's poll interval. An explicit
//! [`disconnect`](ConnectivityPort::disconnect) holds the link down until the
//! next [`connect`](ConnectivityPort::connect).
//!
//! On the device the handler drives a [`BlockingWifi`] attached with
//! [`WifiConnectionHandler::attach_driver`]; the stored credentials are
//! applied as the station configuration on every connect.

use log::{error, info, warn};

use crate::app::ports::{ConnectionState, ConnectivityError, ConnectivityPort};
use crate::config::{Passphrase, Ssid, WifiCredentials};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// 1-32 printable ASCII bytes.
pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

/// Empty (open network) or 8-64 bytes.
pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Connection handler
// ───────────────────────────────────────────────────────────────

pub struct WifiConnectionHandler {
    state: ConnectionState,
    ssid: Ssid,
    password: Passphrase,
    last_rssi: Option<i8>,
    attempts: u32,
    /// Set by an explicit disconnect; suppresses reconnects in `poll`.
    held_down: bool,
    #[cfg(target_os = "espidf")]
    driver: Option<BlockingWifi<EspWifi<'static>>>,
    /// Simulation: number of upcoming connect attempts that fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_pending: u32,
    /// Simulation: the access point went away.
    #[cfg(not(target_os = "espidf"))]
    sim_link_lost: bool,
}

impl WifiConnectionHandler {
    /// Create a handler for the given network. Does not connect.
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        let mut handler = Self {
            state: ConnectionState::Init,
            ssid: Ssid::new(),
            password: Passphrase::new(),
            last_rssi: None,
            attempts: 0,
            held_down: false,
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            sim_failures_pending: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_link_lost: false,
        };
        handler.set_credentials(ssid, password)?;
        Ok(handler)
    }

    pub fn from_credentials(creds: &WifiCredentials) -> Result<Self, ConnectivityError> {
        Self::new(&creds.ssid, &creds.password)
    }

    /// Replace the stored credentials. Takes effect on the next connect.
    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|()| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|()| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Connect attempts since creation.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Hand over the station driver built by the firmware entry point.
    #[cfg(target_os = "espidf")]
    pub fn attach_driver(&mut self, driver: BlockingWifi<EspWifi<'static>>) {
        self.driver = Some(driver);
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Make the next `n` connect attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulate_connect_failures(&mut self, n: u32) {
        self.sim_failures_pending = n;
    }

    /// Drop the link as if the access point disappeared.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulate_link_loss(&mut self) {
        self.sim_link_lost = true;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let Some(wifi) = self.driver.as_mut() else {
            warn!("WiFi: no station driver attached");
            return Err(ConnectivityError::ConnectionFailed);
        };
        let driver_failed = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: driver error ({})", e);
            ConnectivityError::ConnectionFailed
        };

        let client = ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client))
            .map_err(driver_failed)?;
        if !wifi.is_started().map_err(driver_failed)? {
            wifi.start().map_err(driver_failed)?;
        }
        wifi.connect().map_err(driver_failed)?;
        wifi.wait_netif_up().map_err(driver_failed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_pending > 0 {
            self.sim_failures_pending -= 1;
            warn!("WiFi(sim): simulated connect failure (attempt {})", self.attempts);
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_lost = false;
        info!("WiFi(sim): associated with '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Some(wifi) = self.driver.as_mut() {
            if let Err(e) = wifi.disconnect() {
                warn!("WiFi: disconnect failed ({})", e);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disassociated");
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|wifi| wifi.is_connected().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        !self.sim_link_lost
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        let mut ap_info: esp_idf_svc::sys::wifi_ap_record_t = Default::default();
        let ret = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        (ret == esp_idf_svc::sys::ESP_OK).then_some(ap_info.rssi)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        // Drift between -54 and -66 dBm so telemetry has something to show.
        let oscillation = (self.attempts % 12) as i8 - 6;
        Some((-60_i8).saturating_add(oscillation))
    }

    fn try_connect(&mut self) -> Result<(), ConnectivityError> {
        self.attempts = self.attempts.wrapping_add(1);
        self.state = ConnectionState::Connecting;
        match self.platform_connect() {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                self.last_rssi = self.platform_rssi();
                info!("WiFi: connected (RSSI={:?})", self.last_rssi);
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.state = ConnectionState::Error;
                Err(e)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiConnectionHandler {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.state == ConnectionState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }
        info!("WiFi: connecting to '{}'", self.ssid);
        self.held_down = false;
        self.try_connect()
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = ConnectionState::Disconnected;
        self.held_down = true;
        self.last_rssi = None;
        info!("WiFi: disconnected");
    }

    fn poll(&mut self) {
        match self.state {
            ConnectionState::Connected => {
                if self.platform_link_up() {
                    self.last_rssi = self.platform_rssi();
                } else {
                    warn!("WiFi: connection lost");
                    self.state = ConnectionState::Disconnected;
                    self.last_rssi = None;
                }
            }
            ConnectionState::Disconnected if self.held_down => {}
            ConnectionState::Disconnected | ConnectionState::Error => {
                info!("WiFi: reconnect attempt {}", self.attempts + 1);
                let _ = self.try_connect();
            }
            ConnectionState::Init | ConnectionState::Connecting => {}
        }
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn rssi(&self) -> Option<i8> {
        self.last_rssi
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
