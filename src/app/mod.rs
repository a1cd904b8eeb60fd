//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules for the thing's cloud properties:
//! registration, remote-update handling and publish policy. All
//! interaction with the network and the cloud transport happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without a radio.

pub mod cloud;
pub mod commands;
pub mod events;
pub mod ports;
pub mod property;
pub mod service;
pub mod thing;
