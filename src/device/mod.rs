//! Outbound side of the relay
//!
//! This module handles:
//! - Obtaining access tokens for the device-management API
//! - Sending commands to devices over HTTP

pub mod auth;
pub mod client;
pub mod traits;

pub use auth::TokenSource;
pub use client::CloudIotClient;
pub use traits::DeviceManager;
