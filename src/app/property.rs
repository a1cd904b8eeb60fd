//! Cloud property model.
//!
//! A property is a named `f32` bound to a field of the application context
//! `C` through a getter/setter pair, plus the access mode and sync policy the
//! cloud client uses to decide what flows in which direction.

use serde::{Deserialize, Serialize};

use super::events::PropertyChanged;
use super::ports::EventSink;

/// Property name on the wire, at most 32 bytes.
pub type PropertyName = heapless::String<32>;

/// Maximum length of a property name in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Who may change a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Device → cloud only. Remote writes are rejected.
    Read,
    /// Cloud → device only. Never published.
    Write,
    /// Both directions.
    ReadWrite,
}

impl Permission {
    /// Whether the cloud may write this property.
    pub const fn remote_writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }

    /// Whether the device publishes this property.
    pub const fn publishes(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }
}

/// When a property's local value is pushed to the cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdatePolicy {
    /// Publish when the value moved at least `min_delta` away from the last
    /// synchronised value, no more often than every `min_interval_ms`.
    OnChange { min_delta: f32, min_interval_ms: u32 },
    /// Publish every `interval_ms` whether or not the value changed.
    Every { interval_ms: u32 },
}

impl UpdatePolicy {
    /// Publish on any change, immediately.
    pub const ON_CHANGE: Self = Self::OnChange {
        min_delta: 0.0,
        min_interval_ms: 0,
    };
}

/// Called after a remote update changed the property's value.
pub type ChangeCallback<C> = fn(&mut C, &PropertyChanged, &mut dyn EventSink);

/// Everything needed to register one property.
pub struct PropertySpec<C> {
    pub name: &'static str,
    /// Human-readable label used in diagnostics ("Min Temperature").
    pub label: &'static str,
    pub get: fn(&C) -> f32,
    pub set: fn(&mut C, f32),
    pub permission: Permission,
    pub policy: UpdatePolicy,
    pub on_change: Option<ChangeCallback<C>>,
}

// Manual impls: the derive would require `C: Clone`.
impl<C> Clone for PropertySpec<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for PropertySpec<C> {}

impl<C> core::fmt::Debug for PropertySpec<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("permission", &self.permission)
            .field("policy", &self.policy)
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

/// A single value travelling between device and cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    pub name: PropertyName,
    pub value: f32,
}

impl PropertyUpdate {
    /// Build an update; `None` if `name` exceeds [`MAX_NAME_LEN`].
    pub fn new(name: &str, value: f32) -> Option<Self> {
        let mut n = PropertyName::new();
        n.push_str(name).ok()?;
        Some(Self { name: n, value })
    }
}

/// Registered property plus its synchronisation bookkeeping.
pub(crate) struct Property<C> {
    pub(crate) spec: PropertySpec<C>,
    /// Last value known to match the cloud; `None` until first sync.
    pub(crate) last_synced: Option<f32>,
    /// Uptime (ms) of the last successful publish.
    pub(crate) last_publish_ms: Option<u64>,
}

impl<C> Property<C> {
    pub(crate) fn new(spec: PropertySpec<C>) -> Self {
        Self {
            spec,
            last_synced: None,
            last_publish_ms: None,
        }
    }

    /// Decide whether `value` is due for publishing at `now_ms`.
    pub(crate) fn is_due(&self, value: f32, now_ms: u64) -> bool {
        if !self.spec.permission.publishes() || !value.is_finite() {
            return false;
        }
        let since_publish = self.last_publish_ms.map(|t| now_ms.saturating_sub(t));
        match self.spec.policy {
            UpdatePolicy::OnChange {
                min_delta,
                min_interval_ms,
            } => {
                let changed = match self.last_synced {
                    None => true,
                    Some(prev) => value != prev && (value - prev).abs() >= min_delta,
                };
                changed && since_publish.is_none_or(|dt| dt >= u64::from(min_interval_ms))
            }
            UpdatePolicy::Every { interval_ms } => {
                since_publish.is_none_or(|dt| dt >= u64::from(interval_ms))
            }
        }
    }
}
