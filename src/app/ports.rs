//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (connection handler, cloud link, event sinks, storage)
//! implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches the radio
//! or the cloud transport directly.
//!
//! ## Security notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **StoragePort** implementations SHOULD encrypt sensitive keys
//!   (WiFi passphrase, device key).

use core::fmt;

use crate::config::ThingConfig;

use super::property::{PropertySpec, PropertyUpdate};

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, channel,
/// BLE characteristic, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Cloud registration port (domain → cloud client)
// ───────────────────────────────────────────────────────────────

/// Registration surface of a cloud synchronisation client.
///
/// `C` is the application context the registered getters and setters
/// operate on.
pub trait CloudPort<C> {
    /// Associate the client with a thing on the cloud service.
    fn set_thing_id(&mut self, thing_id: &str) -> Result<(), RegistryError>;

    /// Add a property to the client's table. Returns its table index.
    fn add_property(&mut self, spec: PropertySpec<C>) -> Result<usize, RegistryError>;
}

// ───────────────────────────────────────────────────────────────
// Cloud link port (driven adapter: domain ↔ cloud transport)
// ───────────────────────────────────────────────────────────────

/// Transport carrying property updates to and from the cloud.
///
/// The encoding on the wire belongs to the adapter.
pub trait CloudLink {
    /// Publish one batch of local values.
    fn publish(&mut self, updates: &[PropertyUpdate]) -> Result<(), LinkError>;

    /// Take the next pending remote update, if any.
    fn poll(&mut self) -> Result<Option<PropertyUpdate>, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ network)
// ───────────────────────────────────────────────────────────────

/// Network connection lifecycle as seen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Init,
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Network connection handler.
pub trait ConnectivityPort {
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    /// Drive the connection state machine; called once per poll cycle.
    fn poll(&mut self);
    fn state(&self) -> ConnectionState;
    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
    fn rssi(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists device configuration.
///
/// # Security
///
/// Implementations MUST call [`ThingConfig::validate`] before persisting.
/// Invalid values are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ThingConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ThingConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ThingConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage, namespaced per subsystem.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`CloudPort`] registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Thing ID empty or longer than 64 bytes.
    InvalidThingId,
    /// Property name empty or longer than 32 bytes.
    InvalidName,
    /// A property with this name is already registered.
    DuplicateName(&'static str),
    /// The property table has no free slot.
    TableFull,
}

/// Errors from [`CloudLink`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport has no session with the cloud.
    NotConnected,
    /// A publish was attempted but not accepted.
    PublishFailed,
    /// An inbound message could not be decoded.
    Malformed,
}

/// Errors from [`ConnectivityPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    Full,
    IoError,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThingId => write!(f, "thing id must be 1-64 bytes"),
            Self::InvalidName => write!(f, "property name must be 1-32 bytes"),
            Self::DuplicateName(name) => write!(f, "property '{}' already registered", name),
            Self::TableFull => write!(f, "property table full"),
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "cloud link not connected"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::Malformed => write!(f, "malformed inbound message"),
        }
    }
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
