//! Echo Relay Shared Types
//!
//! This crate provides the event model, payload codec and error taxonomy used
//! by the relay binary. Nothing in here performs I/O.

pub mod codec;
pub mod command;
pub mod error;
pub mod event;

pub use command::{CommandRequest, DevicePath};
pub use error::{DownstreamError, RelayError};
pub use event::{DeviceAttributes, PubsubMessage, PushEnvelope, TriggerEvent};

/// Fixed values of the relay protocol
pub mod relay {
    /// Suffix appended to every decoded device message
    pub const ACK_SUFFIX: &str = " ack";

    /// Attribute keys every inbound message must carry, in validation order
    pub const DEVICE_ID: &str = "deviceId";
    pub const DEVICE_REGISTRY_ID: &str = "deviceRegistryId";
    pub const PROJECT_ID: &str = "projectId";
    pub const DEVICE_REGISTRY_LOCATION: &str = "deviceRegistryLocation";

    pub const REQUIRED_ATTRIBUTES: [&str; 4] = [
        DEVICE_ID,
        DEVICE_REGISTRY_ID,
        PROJECT_ID,
        DEVICE_REGISTRY_LOCATION,
    ];
}
