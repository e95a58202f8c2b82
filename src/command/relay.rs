//! Command relay - turns one inbound device message into one device command

use crate::device::DeviceManager;
use echo_relay_shared::{
    codec, CommandRequest, DeviceAttributes, DevicePath, PubsubMessage, RelayError,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Relays device messages back to their device as acknowledged commands
pub struct CommandRelay {
    devices: Arc<dyn DeviceManager>,
}

impl CommandRelay {
    /// Create a relay that delivers commands through the given backend
    pub fn new(devices: Arc<dyn DeviceManager>) -> Self {
        Self { devices }
    }

    /// Validate a message and build the command it should produce
    ///
    /// Performs no I/O; every failure here happens before anything is sent.
    pub fn prepare(message: &PubsubMessage) -> Result<(CommandRequest, String), RelayError> {
        let attributes = DeviceAttributes::try_from(message)?;
        let (command, encoded) = codec::acknowledge(&message.data)?;
        let request = CommandRequest::new(DevicePath::new(&attributes), encoded);
        Ok((request, command))
    }

    /// Run one relay invocation
    pub async fn relay(&self, message: &PubsubMessage) -> Result<(), RelayError> {
        let (request, command) = match Self::prepare(message) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(
                    "Rejected event {}: {}",
                    message.message_id.as_deref().unwrap_or("-"),
                    e
                );
                return Err(e);
            }
        };

        info!("Sending message: {}", command);

        self.devices.send_command(&request).await.map_err(|e| {
            warn!(
                "Failed to send command to {} via {}: {}",
                request.name,
                self.devices.name(),
                e
            );
            RelayError::from(e)
        })?;

        info!("Command delivered to {}", request.name);
        Ok(())
    }
}
