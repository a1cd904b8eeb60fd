//! Registration contract: which properties, which modes, which callbacks.

use crate::mock_cloud::{CloudCall, CollectSink, RecordingCloud};

use thingprops::app::cloud::CloudClient;
use thingprops::app::ports::RegistryError;
use thingprops::app::property::{Permission, PropertyUpdate, UpdatePolicy};
use thingprops::app::thing::{
    MIN_TEMPERATURE, TEMPERATURE, ThingContext, init_properties, on_min_temperature_change,
};
use thingprops::app::events::PropertyChanged;

#[test]
fn init_sets_thing_id_then_adds_two_properties() {
    let mut cloud = RecordingCloud::default();
    init_properties(&mut cloud, "your-thing-id").unwrap();

    assert_eq!(
        cloud.calls,
        vec![
            CloudCall::SetThingId("your-thing-id".into()),
            CloudCall::AddProperty {
                name: TEMPERATURE,
                permission: Permission::Read,
                policy: UpdatePolicy::ON_CHANGE,
                has_callback: false,
            },
            CloudCall::AddProperty {
                name: MIN_TEMPERATURE,
                permission: Permission::ReadWrite,
                policy: UpdatePolicy::ON_CHANGE,
                has_callback: true,
            },
        ]
    );
}

#[test]
fn registrar_does_no_validation_of_its_own() {
    // An empty thing id is passed straight through; rejecting it is the
    // client's job.
    let mut cloud = RecordingCloud::default();
    assert!(init_properties(&mut cloud, "").is_ok());
    assert_eq!(cloud.calls[0], CloudCall::SetThingId(String::new()));
}

#[test]
fn client_errors_propagate() {
    let mut client: CloudClient<ThingContext> = CloudClient::new();
    assert_eq!(
        init_properties(&mut client, ""),
        Err(RegistryError::InvalidThingId)
    );
    assert!(client.is_empty());
}

#[test]
fn double_init_reports_duplicate() {
    let mut client = CloudClient::new();
    init_properties(&mut client, "thing").unwrap();
    let second = init_properties(&mut client, "thing");
    assert_eq!(second, Err(RegistryError::DuplicateName(TEMPERATURE)));
    assert_eq!(client.len(), 2);
}

#[test]
fn callback_emits_change_event_only() {
    let mut ctx = ThingContext {
        temperature: 21.0,
        min_temperature: 18.5,
    };
    let mut sink = CollectSink::new();
    let change = PropertyChanged {
        name: MIN_TEMPERATURE,
        label: "Min Temperature",
        old_value: 0.0,
        new_value: 18.5,
    };
    on_min_temperature_change(&mut ctx, &change, &mut sink);

    assert_eq!(sink.change_lines(), ["Min Temperature changed to: 18.5"]);
    assert_eq!(ctx.temperature, 21.0);
    assert_eq!(ctx.min_temperature, 18.5);
}

#[test]
fn remote_write_to_temperature_never_reaches_context() {
    let mut client = CloudClient::new();
    init_properties(&mut client, "thing").unwrap();
    let mut ctx = ThingContext::default();
    let mut sink = CollectSink::new();

    let upd = PropertyUpdate::new(TEMPERATURE, 99.0).unwrap();
    assert!(client.apply_remote(&mut ctx, &upd, &mut sink).is_err());
    assert_eq!(ctx.temperature, 0.0);
    assert!(sink.events.is_empty());
}
