//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the cloud link,
//! local application code) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use super::property::PropertyUpdate;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// A property value arrived from the cloud.
    RemoteUpdate(PropertyUpdate),

    /// Forget sync state so every publishable property goes out again.
    RequestSync,

    /// New local reading for the read-only `temperature` property.
    /// Non-finite readings are dropped with a warning.
    SetTemperature(f32),
}
