//! Cloud synchronisation client.
//!
//! [`CloudClient`] owns the property table for one thing. It applies
//! updates arriving from the cloud (permission checks, change detection,
//! callbacks) and decides which local values are due for publishing
//! according to each property's [`UpdatePolicy`](super::property::UpdatePolicy).
//!
//! ```text
//!   CloudLink::poll ──▶ apply_remote ──▶ setter + ChangeCallback
//!   getter ──▶ sync (policy) ──▶ CloudLink::publish
//! ```
//!
//! The client never touches the transport on its own; the
//! [`AppService`](super::service::AppService) drives it once per poll cycle.

use core::fmt;

use log::{debug, info};

use crate::config::{CloudId, bounded};

use super::events::PropertyChanged;
use super::ports::{CloudLink, CloudPort, EventSink, LinkError, RegistryError};
use super::property::{MAX_NAME_LEN, Permission, Property, PropertySpec, PropertyUpdate};

/// Maximum number of properties per thing.
pub const MAX_PROPERTIES: usize = 16;

const MAX_THING_ID_LEN: usize = 64;

/// Why a remote update was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// No property with that name is registered.
    UnknownProperty,
    /// The property is read-only from the cloud's side.
    ReadOnly,
    /// NaN or infinite value.
    InvalidValue,
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProperty => write!(f, "unknown property"),
            Self::ReadOnly => write!(f, "property is read-only"),
            Self::InvalidValue => write!(f, "value is not finite"),
        }
    }
}

/// Property table and sync engine for one thing.
pub struct CloudClient<C> {
    thing_id: CloudId,
    properties: heapless::Vec<Property<C>, MAX_PROPERTIES>,
}

impl<C> Default for CloudClient<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CloudClient<C> {
    pub fn new() -> Self {
        Self {
            thing_id: CloudId::new(),
            properties: heapless::Vec::new(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Thing ID set by [`CloudPort::set_thing_id`]; empty until then.
    pub fn thing_id(&self) -> &str {
        self.thing_id.as_str()
    }

    /// Number of registered properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Registered property names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(|p| p.spec.name)
    }

    /// Registration record for `name`.
    pub fn spec(&self, name: &str) -> Option<&PropertySpec<C>> {
        self.find(name).map(|p| &p.spec)
    }

    /// Access mode of `name`.
    pub fn permission(&self, name: &str) -> Option<Permission> {
        self.find(name).map(|p| p.spec.permission)
    }

    /// Last value of `name` known to match the cloud.
    pub fn last_synced(&self, name: &str) -> Option<f32> {
        self.find(name).and_then(|p| p.last_synced)
    }

    fn find(&self, name: &str) -> Option<&Property<C>> {
        self.properties.iter().find(|p| p.spec.name == name)
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Apply a value received from the cloud.
    ///
    /// Returns `Ok(true)` if the value changed (and the callback, if any,
    /// ran), `Ok(false)` if it matched the current value.
    pub fn apply_remote(
        &mut self,
        ctx: &mut C,
        update: &PropertyUpdate,
        sink: &mut dyn EventSink,
    ) -> Result<bool, UpdateError> {
        let prop = self
            .properties
            .iter_mut()
            .find(|p| p.spec.name == update.name.as_str())
            .ok_or(UpdateError::UnknownProperty)?;

        if !prop.spec.permission.remote_writable() {
            return Err(UpdateError::ReadOnly);
        }
        if !update.value.is_finite() {
            return Err(UpdateError::InvalidValue);
        }

        // A value that came from the cloud is by definition in sync.
        prop.last_synced = Some(update.value);

        let old_value = (prop.spec.get)(ctx);
        if old_value == update.value {
            debug!("Cloud: '{}' unchanged at {}", prop.spec.name, old_value);
            return Ok(false);
        }

        (prop.spec.set)(ctx, update.value);
        debug!(
            "Cloud: '{}' {} -> {} (remote)",
            prop.spec.name, old_value, update.value
        );

        if let Some(callback) = prop.spec.on_change {
            let change = PropertyChanged {
                name: prop.spec.name,
                label: prop.spec.label,
                old_value,
                new_value: update.value,
            };
            callback(ctx, &change, sink);
        }
        Ok(true)
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Publish every property whose policy says it is due.
    ///
    /// Sync bookkeeping only advances when the link accepted the batch, so
    /// a failed publish is retried on the next cycle.
    pub fn sync(
        &mut self,
        ctx: &C,
        now_ms: u64,
        link: &mut impl CloudLink,
    ) -> Result<usize, LinkError> {
        let mut batch: heapless::Vec<PropertyUpdate, MAX_PROPERTIES> = heapless::Vec::new();
        let mut due: heapless::Vec<usize, MAX_PROPERTIES> = heapless::Vec::new();

        for (idx, prop) in self.properties.iter().enumerate() {
            let value = (prop.spec.get)(ctx);
            if !prop.is_due(value, now_ms) {
                continue;
            }
            if let Some(update) = PropertyUpdate::new(prop.spec.name, value) {
                // Both vecs share the table's capacity.
                let _ = batch.push(update);
                let _ = due.push(idx);
            }
        }

        if batch.is_empty() {
            return Ok(0);
        }

        link.publish(&batch)?;

        for (idx, update) in due.iter().zip(batch.iter()) {
            let prop = &mut self.properties[*idx];
            prop.last_synced = Some(update.value);
            prop.last_publish_ms = Some(now_ms);
        }
        debug!("Cloud: published {} update(s)", batch.len());
        Ok(batch.len())
    }

    /// Forget all sync state; the next [`sync`](Self::sync) republishes
    /// every publishable property.
    pub fn invalidate_sync(&mut self) {
        for prop in &mut self.properties {
            prop.last_synced = None;
            prop.last_publish_ms = None;
        }
    }
}

impl<C> CloudPort<C> for CloudClient<C> {
    fn set_thing_id(&mut self, thing_id: &str) -> Result<(), RegistryError> {
        if thing_id.is_empty() || thing_id.len() > MAX_THING_ID_LEN {
            return Err(RegistryError::InvalidThingId);
        }
        self.thing_id = bounded(thing_id);
        info!("Cloud: thing id set to '{}'", self.thing_id);
        Ok(())
    }

    fn add_property(&mut self, spec: PropertySpec<C>) -> Result<usize, RegistryError> {
        if spec.name.is_empty() || spec.name.len() > MAX_NAME_LEN {
            return Err(RegistryError::InvalidName);
        }
        if self.find(spec.name).is_some() {
            return Err(RegistryError::DuplicateName(spec.name));
        }
        let idx = self.properties.len();
        self.properties
            .push(Property::new(spec))
            .map_err(|_| RegistryError::TableFull)?;
        info!(
            "Cloud: registered '{}' ({:?}, {:?})",
            spec.name, spec.permission, spec.policy
        );
        Ok(idx)
    }
}
