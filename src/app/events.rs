//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and property callbacks
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them: print to the
//! serial console, queue them on a channel, etc.

use core::fmt;

use crate::config::CloudId;

use super::ports::ConnectionState;
use super::property::{Permission, PropertyName};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Properties were registered for this thing.
    Started { thing_id: CloudId, properties: usize },

    /// One property entered the cloud client's table.
    PropertyRegistered {
        name: &'static str,
        permission: Permission,
    },

    /// A remote update changed a property's value.
    PropertyChanged(PropertyChanged),

    /// A remote update was refused.
    RemoteUpdateRejected {
        name: PropertyName,
        reason: super::cloud::UpdateError,
    },

    /// A batch of local values went out to the cloud.
    Published { count: usize },

    /// The network connection moved between states.
    ConnectionChanged {
        from: ConnectionState,
        to: ConnectionState,
    },
}

/// A property value changed because of a remote update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyChanged {
    pub name: &'static str,
    pub label: &'static str,
    pub old_value: f32,
    pub new_value: f32,
}

impl fmt::Display for PropertyChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} changed to: {}", self.label, self.new_value)
    }
}
