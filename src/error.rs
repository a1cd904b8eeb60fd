//! Unified error type for the firmware.
//!
//! Each port defines its own small error enum; this module funnels them
//! into a single `Error` so the boot sequence and top-level loop can use
//! `?` uniformly. All variants are `Copy`.

use core::fmt;

use crate::app::cloud::UpdateError;
use crate::app::ports::{ConfigError, ConnectivityError, LinkError, RegistryError, StorageError};

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Property registration failed.
    Registry(RegistryError),
    /// A remote update was refused.
    Update(UpdateError),
    /// The cloud transport failed.
    Link(LinkError),
    /// The network connection handler failed.
    Connectivity(ConnectivityError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Persistent storage failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Update(e) => write!(f, "update: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<UpdateError> for Error {
    fn from(e: UpdateError) -> Self {
        Self::Update(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
