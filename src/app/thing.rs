//! Thing properties: the two cloud variables and their registration.
//!
//! | Property         | Permission  | Policy      | Callback                     |
//! |------------------|-------------|-------------|------------------------------|
//! | `temperature`    | `Read`      | on change   | none                         |
//! | `minTemperature` | `ReadWrite` | on change   | [`on_min_temperature_change`]|

use super::events::{AppEvent, PropertyChanged};
use super::ports::{CloudPort, EventSink, RegistryError};
use super::property::{Permission, PropertySpec, UpdatePolicy};

pub const TEMPERATURE: &str = "temperature";
pub const MIN_TEMPERATURE: &str = "minTemperature";

/// Application state shared with the cloud client.
///
/// `temperature` is written by local application code (sensor readings);
/// `min_temperature` is written by the cloud.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThingContext {
    pub temperature: f32,
    pub min_temperature: f32,
}

/// Register both properties with `client`.
///
/// Not idempotent: a second call fails with
/// [`RegistryError::DuplicateName`].
pub fn init_properties(
    client: &mut impl CloudPort<ThingContext>,
    thing_id: &str,
) -> Result<(), RegistryError> {
    init_properties_with(client, thing_id, UpdatePolicy::ON_CHANGE)
}

/// [`init_properties`] with a custom publish policy for `temperature`.
pub fn init_properties_with(
    client: &mut impl CloudPort<ThingContext>,
    thing_id: &str,
    temperature_policy: UpdatePolicy,
) -> Result<(), RegistryError> {
    client.set_thing_id(thing_id)?;
    client.add_property(PropertySpec {
        name: TEMPERATURE,
        label: "Temperature",
        get: |ctx| ctx.temperature,
        set: |ctx, v| ctx.temperature = v,
        permission: Permission::Read,
        policy: temperature_policy,
        on_change: None,
    })?;
    client.add_property(PropertySpec {
        name: MIN_TEMPERATURE,
        label: "Min Temperature",
        get: |ctx| ctx.min_temperature,
        set: |ctx, v| ctx.min_temperature = v,
        permission: Permission::ReadWrite,
        policy: UpdatePolicy::ON_CHANGE,
        on_change: Some(on_min_temperature_change),
    })?;
    Ok(())
}

/// Runs after the cloud changed `minTemperature`.
pub fn on_min_temperature_change(
    _ctx: &mut ThingContext,
    change: &PropertyChanged,
    sink: &mut dyn EventSink,
) {
    sink.emit(&AppEvent::PropertyChanged(*change));
}
