//! Mock adapters for integration tests.
//!
//! Record every call so tests can assert on the full history without a
//! radio or a cloud session.

use thingprops::app::events::AppEvent;
use thingprops::app::ports::{
    CloudPort, ConnectionState, ConnectivityError, ConnectivityPort, EventSink, RegistryError,
};
use thingprops::app::property::{Permission, PropertySpec, UpdatePolicy};
use thingprops::app::thing::ThingContext;

// ── Registration recorder ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CloudCall {
    SetThingId(String),
    AddProperty {
        name: &'static str,
        permission: Permission,
        policy: UpdatePolicy,
        has_callback: bool,
    },
}

/// A [`CloudPort`] that accepts everything and keeps a log.
#[derive(Default)]
pub struct RecordingCloud {
    pub calls: Vec<CloudCall>,
}

impl CloudPort<ThingContext> for RecordingCloud {
    fn set_thing_id(&mut self, thing_id: &str) -> Result<(), RegistryError> {
        self.calls.push(CloudCall::SetThingId(thing_id.to_owned()));
        Ok(())
    }

    fn add_property(&mut self, spec: PropertySpec<ThingContext>) -> Result<usize, RegistryError> {
        self.calls.push(CloudCall::AddProperty {
            name: spec.name,
            permission: spec.permission,
            policy: spec.policy,
            has_callback: spec.on_change.is_some(),
        });
        let added = self
            .calls
            .iter()
            .filter(|c| matches!(c, CloudCall::AddProperty { .. }))
            .count();
        Ok(added - 1)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostic lines produced by property-change callbacks.
    pub fn change_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PropertyChanged(change) => Some(change.to_string()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Scripted connection ───────────────────────────────────────

/// Connection whose state the test sets directly.
pub struct ScriptedConnection {
    pub state: ConnectionState,
    pub connect_calls: u32,
}

#[allow(dead_code)]
impl ScriptedConnection {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Init,
            connect_calls: 0,
        }
    }
}

impl Default for ScriptedConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityPort for ScriptedConnection {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        self.connect_calls += 1;
        self.state = ConnectionState::Connected;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    fn poll(&mut self) {}

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn rssi(&self) -> Option<i8> {
        None
    }
}
