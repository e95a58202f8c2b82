//! Failure kinds of a single relay invocation
//!
//! Every variant is fatal to the invocation that produced it. Nothing here is
//! retried; redelivery is left to whoever delivered the event.

use thiserror::Error;

use crate::codec::CodecError;

/// Errors reported by the device-management API client
#[derive(Error, Debug)]
pub enum DownstreamError {
    #[error("Failed to obtain access token: {0}")]
    Auth(String),

    #[error("Device API request failed: {0}")]
    Transport(String),

    #[error("Device API replied with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors that terminate a relay invocation
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing required attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("Invalid value for attribute {key}: {value:?}")]
    InvalidAttribute { key: &'static str, value: String },

    #[error("Malformed payload: {0}")]
    Decode(#[from] CodecError),

    #[error("Downstream call failed: {0}")]
    Downstream(#[from] DownstreamError),
}

impl RelayError {
    /// Whether the event itself is malformed, as opposed to the downstream call failing
    pub fn is_malformed_event(&self) -> bool {
        matches!(
            self,
            Self::MissingAttribute(_) | Self::InvalidAttribute { .. } | Self::Decode(_)
        )
    }
}
