//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the application context, the cloud client and the
//! network connection handler. It exposes a hardware-agnostic API; the
//! cloud transport and event sink are injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  ConnectivityPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                       │       AppService        │
//!  CloudLink ◀────────▶ │  ThingContext · Client  │
//!                       └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::ThingConfig;

use super::cloud::CloudClient;
use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    CloudLink, ConnectionState, ConnectivityPort, EventSink, LinkError, RegistryError,
};
use super::property::UpdatePolicy;
use super::thing::{ThingContext, init_properties_with};

/// Upper bound on remote updates drained per poll cycle.
const MAX_INBOUND_PER_CYCLE: usize = 32;

/// Registration lifecycle. One-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrarState {
    Uninitialized,
    Registered,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<N> {
    config: ThingConfig,
    ctx: ThingContext,
    client: CloudClient<ThingContext>,
    connection: N,
    state: RegistrarState,
    /// Connection state seen at the end of the previous cycle.
    last_connection: ConnectionState,
    cycle_count: u64,
}

impl<N: ConnectivityPort> AppService<N> {
    /// Construct the service. Does **not** register properties; call
    /// [`start`](Self::start) next.
    pub fn new(config: ThingConfig, connection: N) -> Self {
        let last_connection = connection.state();
        Self {
            config,
            ctx: ThingContext::default(),
            client: CloudClient::new(),
            connection,
            state: RegistrarState::Uninitialized,
            last_connection,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Register the thing's properties and bring the network up.
    ///
    /// Fails if registration fails, including when called a second time.
    /// A failed network connect is not fatal; [`update`](Self::update)
    /// keeps polling the connection handler.
    pub fn start(&mut self, sink: &mut impl EventSink) -> Result<(), RegistryError> {
        let temperature_policy = UpdatePolicy::OnChange {
            min_delta: self.config.temperature_min_delta,
            min_interval_ms: 0,
        };
        init_properties_with(
            &mut self.client,
            &self.config.identity.thing_id,
            temperature_policy,
        )?;
        self.state = RegistrarState::Registered;

        for name in self.client.names() {
            if let Some(permission) = self.client.permission(name) {
                sink.emit(&AppEvent::PropertyRegistered { name, permission });
            }
        }
        sink.emit(&AppEvent::Started {
            thing_id: self.config.identity.thing_id.clone(),
            properties: self.client.len(),
        });
        info!(
            "AppService started: thing '{}', {} properties",
            self.client.thing_id(),
            self.client.len()
        );

        if let Err(e) = self.connection.connect() {
            warn!("Initial connect failed: {}", e);
        }
        Ok(())
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one cooperative poll cycle: connection → inbound → outbound.
    ///
    /// Returns the number of properties published this cycle.
    pub fn update(
        &mut self,
        now_ms: u64,
        link: &mut impl CloudLink,
        sink: &mut impl EventSink,
    ) -> Result<usize, LinkError> {
        self.cycle_count += 1;

        // 1. Connection
        self.connection.poll();
        let current = self.connection.state();
        if current != self.last_connection {
            sink.emit(&AppEvent::ConnectionChanged {
                from: self.last_connection,
                to: current,
            });
            if current == ConnectionState::Connected {
                // The cloud may have missed anything published before the drop.
                self.client.invalidate_sync();
            }
            self.last_connection = current;
        }

        if self.state != RegistrarState::Registered || current != ConnectionState::Connected {
            return Ok(0);
        }

        // 2. Remote updates
        for _ in 0..MAX_INBOUND_PER_CYCLE {
            match link.poll() {
                Ok(Some(update)) => self.handle_command(AppCommand::RemoteUpdate(update), sink),
                Ok(None) => break,
                Err(LinkError::Malformed) => warn!("Dropping malformed inbound message"),
                Err(e) => return Err(e),
            }
        }

        // 3. Local values
        let published = self.client.sync(&self.ctx, now_ms, link)?;
        if published > 0 {
            sink.emit(&AppEvent::Published { count: published });
        }
        Ok(published)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (cloud link, local application code).
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::RemoteUpdate(update) => {
                if let Err(reason) = self.client.apply_remote(&mut self.ctx, &update, sink) {
                    warn!("Rejected remote update '{}': {}", update.name, reason);
                    sink.emit(&AppEvent::RemoteUpdateRejected {
                        name: update.name,
                        reason,
                    });
                }
            }
            AppCommand::RequestSync => {
                self.client.invalidate_sync();
                info!("Full property resync requested");
            }
            AppCommand::SetTemperature(value) => {
                if value.is_finite() {
                    self.ctx.temperature = value;
                } else {
                    warn!("Ignoring non-finite temperature reading ({})", value);
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> RegistrarState {
        self.state
    }

    pub fn context(&self) -> &ThingContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ThingContext {
        &mut self.ctx
    }

    pub fn client(&self) -> &CloudClient<ThingContext> {
        &self.client
    }

    pub fn connection(&self) -> &N {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut N {
        &mut self.connection
    }

    pub fn config(&self) -> &ThingConfig {
        &self.config
    }

    /// Poll cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}
