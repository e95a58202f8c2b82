//! Device-management API abstraction for pluggable backends

use async_trait::async_trait;
use echo_relay_shared::{CommandRequest, DownstreamError};

/// Delivers commands to devices through a device-management service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceManager: Send + Sync {
    /// Send a command to the device named in the request, waiting for the service to accept it
    async fn send_command(&self, request: &CommandRequest) -> Result<(), DownstreamError>;

    /// Human-readable name for this backend
    fn name(&self) -> &'static str;
}
