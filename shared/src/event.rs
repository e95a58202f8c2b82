//! Inbound pub/sub event model
//!
//! The trigger arrives either as a structured cloud event wrapping a push
//! envelope, or as the bare push envelope (binary-mode cloud events and plain
//! push subscriptions):
//! ```text
//! { "data": { "message": { "attributes": {..}, "data": "<base64>" } } }
//! { "message": { "attributes": {..}, "data": "<base64>" } }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::relay;

/// A single pub/sub message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Base64-encoded payload
    #[serde(default)]
    pub data: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
}

/// Push delivery body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: PubsubMessage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

/// Any of the accepted trigger shapes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TriggerEvent {
    /// Structured cloud event with the push envelope under `data`
    CloudEvent { data: PushEnvelope },
    /// Bare push envelope
    Push(PushEnvelope),
}

impl TriggerEvent {
    /// Get the pub/sub message carried by this event
    pub fn message(&self) -> &PubsubMessage {
        match self {
            TriggerEvent::CloudEvent { data } => &data.message,
            TriggerEvent::Push(envelope) => &envelope.message,
        }
    }
}

/// Device addressing extracted from message attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAttributes {
    pub device_id: String,
    pub registry_id: String,
    pub project_id: String,
    pub region: String,
}

impl DeviceAttributes {
    /// Extract the four required attributes
    ///
    /// Fails with [`RelayError::MissingAttribute`] naming the first absent key,
    /// or [`RelayError::InvalidAttribute`] for a value that is not a single
    /// path segment.
    pub fn from_attributes(attributes: &HashMap<String, String>) -> Result<Self, RelayError> {
        let get = |key: &'static str| {
            let value = attributes
                .get(key)
                .ok_or(RelayError::MissingAttribute(key))?;
            if !is_path_segment(value) {
                return Err(RelayError::InvalidAttribute {
                    key,
                    value: value.clone(),
                });
            }
            Ok(value.clone())
        };

        Ok(Self {
            device_id: get(relay::DEVICE_ID)?,
            registry_id: get(relay::DEVICE_REGISTRY_ID)?,
            project_id: get(relay::PROJECT_ID)?,
            region: get(relay::DEVICE_REGISTRY_LOCATION)?,
        })
    }
}

/// Values end up inside the device path and the request URL, so each must stay one segment
fn is_path_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '?', '#'])
}

impl TryFrom<&PubsubMessage> for DeviceAttributes {
    type Error = RelayError;

    fn try_from(message: &PubsubMessage) -> Result<Self, Self::Error> {
        Self::from_attributes(&message.attributes)
    }
}
