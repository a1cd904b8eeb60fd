//! In-memory cloud link.
//!
//! Implements [`CloudLink`] without a network: remote updates are queued by
//! the test or simulation driver, published batches are recorded. Used on
//! the host and as the device's link until a broker transport is wired in.
//!
//! Inbound messages can be injected as JSON objects:
//!
//! ```text
//! {"name": "minTemperature", "value": 18.5}
//! ```

use std::collections::VecDeque;

use log::{debug, warn};

use crate::app::ports::{CloudLink, LinkError};
use crate::app::property::PropertyUpdate;

/// Raw inbound message as received from the far side.
enum Inbound {
    Update(PropertyUpdate),
    Json(String),
}

#[derive(Default)]
pub struct LoopbackLink {
    inbound: VecDeque<Inbound>,
    published: Vec<Vec<PropertyUpdate>>,
    offline: bool,
}

impl LoopbackLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a remote update for the next [`poll`](CloudLink::poll).
    pub fn push_remote(&mut self, update: PropertyUpdate) {
        self.inbound.push_back(Inbound::Update(update));
    }

    /// Queue a raw JSON message; decoded when polled.
    pub fn inject_json(&mut self, message: &str) {
        self.inbound.push_back(Inbound::Json(message.to_owned()));
    }

    /// Simulate the cloud session going away (or coming back).
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Every batch accepted so far, oldest first.
    pub fn published(&self) -> &[Vec<PropertyUpdate>] {
        &self.published
    }

    /// Most recent value published for `name`.
    pub fn last_published(&self, name: &str) -> Option<f32> {
        self.published
            .iter()
            .rev()
            .flat_map(|batch| batch.iter())
            .find(|u| u.name.as_str() == name)
            .map(|u| u.value)
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }
}

impl CloudLink for LoopbackLink {
    fn publish(&mut self, updates: &[PropertyUpdate]) -> Result<(), LinkError> {
        if self.offline {
            return Err(LinkError::NotConnected);
        }
        if let Ok(json) = serde_json::to_string(updates) {
            debug!("Loopback: publish {}", json);
        }
        self.published.push(updates.to_vec());
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<PropertyUpdate>, LinkError> {
        if self.offline {
            return Err(LinkError::NotConnected);
        }
        match self.inbound.pop_front() {
            None => Ok(None),
            Some(Inbound::Update(update)) => Ok(Some(update)),
            Some(Inbound::Json(raw)) => match serde_json::from_str::<PropertyUpdate>(&raw) {
                Ok(update) => Ok(Some(update)),
                Err(e) => {
                    warn!("Loopback: undecodable message ({})", e);
                    Err(LinkError::Malformed)
                }
            },
        }
    }
}
