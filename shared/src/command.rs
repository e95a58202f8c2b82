//! Outbound command request

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::DeviceAttributes;

/// Hierarchical resource name of a device within a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePath(String);

impl DevicePath {
    pub fn new(attributes: &DeviceAttributes) -> Self {
        Self(format!(
            "projects/{}/locations/{}/registries/{}/devices/{}",
            attributes.project_id, attributes.region, attributes.registry_id, attributes.device_id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DevicePath> for String {
    fn from(path: DevicePath) -> Self {
        path.0
    }
}

/// Body of a "send command to device" call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Device path the command is addressed to
    pub name: String,
    /// Base64-encoded command bytes
    pub binary_data: String,
}

impl CommandRequest {
    pub fn new(path: DevicePath, binary_data: impl Into<String>) -> Self {
        Self {
            name: path.into(),
            binary_data: binary_data.into(),
        }
    }
}
