//! Command relay for device messages
//!
//! This module handles:
//! - Validating the device attributes of an inbound message
//! - Turning its payload into an acknowledgment command
//! - Handing the command to the device-management backend

mod relay;

pub use relay::CommandRelay;
