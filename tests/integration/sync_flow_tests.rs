//! End-to-end poll cycles: WiFi handler + loopback link + AppService.

use crate::mock_cloud::{CollectSink, ScriptedConnection};

use thingprops::adapters::loopback::LoopbackLink;
use thingprops::adapters::wifi::WifiConnectionHandler;
use thingprops::app::events::AppEvent;
use thingprops::app::ports::{ConnectionState, ConnectivityPort, LinkError};
use thingprops::app::property::PropertyUpdate;
use thingprops::app::service::AppService;
use thingprops::app::thing::{MIN_TEMPERATURE, TEMPERATURE};
use thingprops::config::ThingConfig;

fn make_app() -> (AppService<WifiConnectionHandler>, LoopbackLink, CollectSink) {
    let config = ThingConfig::default();
    let wifi = WifiConnectionHandler::from_credentials(&config.wifi).unwrap();
    let mut app = AppService::new(config, wifi);
    let mut sink = CollectSink::new();
    app.start(&mut sink).unwrap();
    (app, LoopbackLink::new(), sink)
}

#[test]
fn remote_min_temperature_update_prints_once() {
    let (mut app, mut link, mut sink) = make_app();
    app.update(0, &mut link, &mut sink).unwrap();

    link.push_remote(PropertyUpdate::new(MIN_TEMPERATURE, 18.5).unwrap());
    app.update(100, &mut link, &mut sink).unwrap();

    assert_eq!(app.context().min_temperature, 18.5);
    assert_eq!(sink.change_lines(), ["Min Temperature changed to: 18.5"]);
}

#[test]
fn first_cycle_publishes_both_properties() {
    let (mut app, mut link, mut sink) = make_app();
    assert_eq!(app.update(0, &mut link, &mut sink), Ok(2));
    assert_eq!(link.last_published(TEMPERATURE), Some(0.0));
    assert_eq!(link.last_published(MIN_TEMPERATURE), Some(0.0));
    assert!(sink.events.contains(&AppEvent::ConnectionChanged {
        from: ConnectionState::Init,
        to: ConnectionState::Connected,
    }));
}

#[test]
fn remote_value_is_not_echoed_back() {
    let (mut app, mut link, mut sink) = make_app();
    app.update(0, &mut link, &mut sink).unwrap();
    let batches = link.published().len();

    link.inject_json(r#"{"name":"minTemperature","value":16.0}"#);
    assert_eq!(app.update(100, &mut link, &mut sink), Ok(0));
    assert_eq!(link.published().len(), batches);
}

#[test]
fn local_temperature_published_on_change_only() {
    let (mut app, mut link, mut sink) = make_app();
    app.update(0, &mut link, &mut sink).unwrap();

    app.context_mut().temperature = 22.25;
    assert_eq!(app.update(100, &mut link, &mut sink), Ok(1));
    assert_eq!(link.last_published(TEMPERATURE), Some(22.25));

    assert_eq!(app.update(200, &mut link, &mut sink), Ok(0));
}

#[test]
fn remote_write_to_read_only_is_rejected_with_event() {
    let (mut app, mut link, mut sink) = make_app();
    app.update(0, &mut link, &mut sink).unwrap();

    link.push_remote(PropertyUpdate::new(TEMPERATURE, 40.0).unwrap());
    app.update(100, &mut link, &mut sink).unwrap();

    assert_eq!(app.context().temperature, 0.0);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::RemoteUpdateRejected { .. }))
    );
    assert!(sink.change_lines().is_empty());
}

#[test]
fn malformed_inbound_is_skipped() {
    let (mut app, mut link, mut sink) = make_app();
    app.update(0, &mut link, &mut sink).unwrap();

    link.inject_json("garbage");
    link.push_remote(PropertyUpdate::new(MIN_TEMPERATURE, 5.0).unwrap());
    app.update(100, &mut link, &mut sink).unwrap();
    assert_eq!(app.context().min_temperature, 5.0);
}

#[test]
fn offline_link_surfaces_error_and_retries() {
    let (mut app, mut link, mut sink) = make_app();
    link.set_offline(true);
    assert_eq!(
        app.update(0, &mut link, &mut sink),
        Err(LinkError::NotConnected)
    );
    link.set_offline(false);
    assert_eq!(app.update(100, &mut link, &mut sink), Ok(2));
}

#[test]
fn reconnect_triggers_full_resync() {
    let (mut app, mut link, mut sink) = make_app();
    app.update(0, &mut link, &mut sink).unwrap();

    app.connection_mut().simulate_link_loss();
    assert_eq!(app.update(100, &mut link, &mut sink), Ok(0));
    assert_eq!(app.connection().state(), ConnectionState::Disconnected);

    // Next poll reconnects and republishes everything.
    assert_eq!(app.update(200, &mut link, &mut sink), Ok(2));
    assert!(app.connection().is_connected());
}

#[test]
fn nothing_flows_before_start() {
    let config = ThingConfig::default();
    let wifi = WifiConnectionHandler::from_credentials(&config.wifi).unwrap();
    let mut app = AppService::new(config, wifi);
    let mut link = LoopbackLink::new();
    let mut sink = CollectSink::new();

    assert_eq!(app.update(0, &mut link, &mut sink), Ok(0));
    assert!(link.published().is_empty());
}

#[test]
fn start_connects_exactly_once() {
    let mut app = AppService::new(ThingConfig::default(), ScriptedConnection::new());
    let mut sink = CollectSink::new();
    app.start(&mut sink).unwrap();
    assert_eq!(app.connection().connect_calls, 1);

    let mut link = LoopbackLink::new();
    app.connection_mut().disconnect();
    assert_eq!(app.update(0, &mut link, &mut sink), Ok(0));
    assert_eq!(app.connection().connect_calls, 1);
}

#[test]
fn explicit_disconnect_is_not_undone_by_polling() {
    let (mut app, mut link, mut sink) = make_app();
    app.update(0, &mut link, &mut sink).unwrap();

    app.connection_mut().disconnect();
    assert_eq!(app.update(100, &mut link, &mut sink), Ok(0));
    assert_eq!(app.update(200, &mut link, &mut sink), Ok(0));
    assert_eq!(app.connection().state(), ConnectionState::Disconnected);

    app.connection_mut().connect().unwrap();
    assert_eq!(app.update(300, &mut link, &mut sink), Ok(2));
}
