//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART / USB-CDC on the device). This is the diagnostic output stream:
//! property changes print as `Min Temperature changed to: 18.5`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                thing_id,
                properties,
            } => {
                info!("START | thing={} properties={}", thing_id, properties);
            }
            AppEvent::PropertyRegistered { name, permission } => {
                info!("PROP  | {} ({:?})", name, permission);
            }
            AppEvent::PropertyChanged(change) => {
                info!("{}", change);
            }
            AppEvent::RemoteUpdateRejected { name, reason } => {
                warn!("PROP  | remote update to '{}' rejected: {}", name, reason);
            }
            AppEvent::Published { count } => {
                info!("SYNC  | published {} value(s)", count);
            }
            AppEvent::ConnectionChanged { from, to } => {
                info!("NET   | {:?} -> {:?}", from, to);
            }
        }
    }
}
