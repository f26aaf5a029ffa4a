//! Error kinds reported while handling a directive

use thiserror::Error;

/// Errors that can occur while handling a single directive
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No supported namespace: {0}")]
    UnsupportedNamespace(String),

    #[error("Invalid access token: {0:?}")]
    InvalidAccessToken(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("No endpoint id provided in request")]
    MissingEndpointId,

    #[error("Device offline: {0}")]
    DeviceOffline(String),

    #[error("No supported directive name: {0}")]
    UnsupportedDirectiveName(String),

    #[error("No such endpoint: {0}")]
    NoSuchEndpoint(String),

    #[error("Endpoint unreachable: {0}")]
    PublishUnreachable(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Malformed directive: {0}")]
    Decode(#[from] serde_json::Error),
}
