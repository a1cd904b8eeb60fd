//! Thing-properties firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  WifiConnectionHandler   LoopbackLink   LogEventSink       │
//! │  (ConnectivityPort)      (CloudLink)    (EventSink)        │
//! │  NvsAdapter              MonotonicClock                    │
//! │  (Config + Storage)                                        │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ─────────────────     │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │            AppService (pure logic)                   │  │
//! │  │  ThingContext · CloudClient · init_properties        │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{info, warn};

use thingprops::Error;
use thingprops::adapters::log_sink::LogEventSink;
use thingprops::adapters::loopback::LoopbackLink;
use thingprops::adapters::nvs::NvsAdapter;
use thingprops::adapters::time::MonotonicClock;
use thingprops::adapters::wifi::WifiConnectionHandler;
use thingprops::app::ports::ConfigPort;
use thingprops::app::service::AppService;
use thingprops::config::ThingConfig;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("thingprops v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new();
    let config = match nvs.as_ref().map_err(|e| *e).and_then(|nvs| nvs.load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using compiled-in defaults", e);
            ThingConfig::default()
        }
    };
    if config.has_placeholders() {
        warn!("Credentials still hold placeholder values; edit src/secrets.rs");
    }
    info!(
        "Thing '{}' as '{}'",
        config.identity.thing_id, config.identity.device_login_name
    );

    // ── 3. Construct adapters ─────────────────────────────────
    let wifi = BlockingWifi::wrap(
        EspWifi::new(
            peripherals.modem,
            sysloop.clone(),
            nvs.as_ref().ok().map(NvsAdapter::partition),
        )?,
        sysloop,
    )?;
    let mut connection =
        WifiConnectionHandler::from_credentials(&config.wifi).map_err(Error::from)?;
    connection.attach_driver(wifi);
    // Cloud traffic stays local until a broker transport implements CloudLink.
    let mut link = LoopbackLink::new();
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    // ── 4. Register properties ────────────────────────────────
    let poll_interval = std::time::Duration::from_millis(u64::from(config.poll_interval_ms));
    let mut app = AppService::new(config, connection);
    app.start(&mut sink).map_err(Error::from)?;

    info!("System ready. Entering poll loop.");

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        if let Err(e) = app.update(clock.uptime_ms(), &mut link, &mut sink) {
            warn!("Cloud sync cycle failed: {}", e);
        }
        std::thread::sleep(poll_interval);
    }
}
