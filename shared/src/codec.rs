//! Payload codec for device messages
//!
//! Device messages travel as base64 text on both legs of the relay:
//! ```text
//! inbound  data:       base64(utf8(message))
//! outbound binaryData: base64(utf8(message + " ack"))
//! ```
//!
//! Both legs use the standard alphabet with padding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::relay::ACK_SUFFIX;

/// Errors that can occur while decoding an inbound payload
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Decode a base64 payload into the UTF-8 message it carries
pub fn decode_payload(data: &str) -> Result<String, CodecError> {
    let bytes = STANDARD.decode(data.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode a message as base64 for transport
pub fn encode_payload(message: &str) -> String {
    STANDARD.encode(message.as_bytes())
}

/// Build the command text sent back to the device
pub fn append_ack(message: &str) -> String {
    let mut command = String::with_capacity(message.len() + ACK_SUFFIX.len());
    command.push_str(message);
    command.push_str(ACK_SUFFIX);
    command
}

/// Decode an inbound payload and produce the encoded acknowledgment command
///
/// Returns the plain command text (for logging) alongside its base64 form.
pub fn acknowledge(data: &str) -> Result<(String, String), CodecError> {
    let command = append_ack(&decode_payload(data)?);
    let encoded = encode_payload(&command);
    Ok((command, encoded))
}
