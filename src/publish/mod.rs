//! Device command delivery
//!
//! A command is delivered by opening a fresh broker connection, publishing a
//! single message and closing the connection again. There is no retry and no
//! confirmation that the device acted on the message.

mod session;

pub use session::SessionPublisher;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::registry::DeviceRecord;
use crate::transport::BrokerEndpoint;

/// One message destined for one device topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub endpoint: BrokerEndpoint,
    pub topic: String,
    pub message: Bytes,
}

impl PublishRequest {
    /// Address `message` to the broker and topic of `device`
    pub fn for_device(device: &DeviceRecord, message: &str) -> Self {
        Self {
            endpoint: BrokerEndpoint::new(device.address.clone(), device.port),
            topic: device.topic.clone(),
            message: Bytes::copy_from_slice(message.as_bytes()),
        }
    }
}

/// Errors that end a delivery attempt
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Broker {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: BrokerEndpoint, reason: String },

    #[error("Publish to {topic} failed: {reason}")]
    Failed { topic: String, reason: String },
}

/// Delivers a single command message
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Resolve once the broker acknowledged the publish or the attempt failed
    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError>;
}
