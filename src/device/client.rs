//! HTTP client for the Cloud IoT device-management API

use crate::device::auth::TokenSource;
use crate::device::traits::DeviceManager;
use async_trait::async_trait;
use echo_relay_shared::{CommandRequest, DownstreamError};
use std::time::Duration;
use tracing::debug;

/// Default public endpoint of the device-management API
pub const DEFAULT_API_ENDPOINT: &str = "https://cloudiot.googleapis.com";

/// Sends commands through `projects.locations.registries.devices.sendCommandToDevice`
pub struct CloudIotClient {
    client: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

impl CloudIotClient {
    /// Create a client for the given API endpoint
    pub fn new(
        endpoint: impl Into<String>,
        tokens: TokenSource,
        timeout: Duration,
    ) -> Result<Self, DownstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DownstreamError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// URL of the send-command method for a device
    pub fn command_url(&self, device_path: &str) -> String {
        format!("{}/v1/{}:sendCommandToDevice", self.endpoint, device_path)
    }
}

#[async_trait]
impl DeviceManager for CloudIotClient {
    async fn send_command(&self, request: &CommandRequest) -> Result<(), DownstreamError> {
        let token = self.tokens.token(&self.client).await?;
        let url = self.command_url(&request.name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| DownstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are informational only
            let body = response.text().await.unwrap_or_default();
            return Err(DownstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Command accepted for {} ({})", request.name, status);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cloudiot"
    }
}
