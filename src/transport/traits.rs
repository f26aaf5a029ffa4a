//! Broker transport abstraction for pluggable message-bus backends

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Network location of a device's broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEndpoint {
    pub host: String,
    pub port: u16,
}

impl BrokerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for BrokerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Delivery guarantee requested for a publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryQos {
    /// Acknowledged once the packet is written out
    AtMostOnce,
    /// Acknowledged by PUBACK
    #[default]
    AtLeastOnce,
    /// Acknowledged by PUBCOMP
    ExactlyOnce,
}

impl DeliveryQos {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(DeliveryQos::AtMostOnce),
            1 => Some(DeliveryQos::AtLeastOnce),
            2 => Some(DeliveryQos::ExactlyOnce),
            _ => None,
        }
    }
}

/// State changes reported by a broker session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Broker accepted the connection
    Connected,
    /// The queued publish was acknowledged
    PublishAcked,
    /// Connection is down (refused, unreachable, dropped)
    Offline { reason: String },
}

/// A single transient connection to a broker
#[async_trait]
pub trait BrokerSession: Send {
    /// Queue a publish; its outcome arrives through [`BrokerSession::next_event`]
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<()>;

    /// Wait for the next session event
    async fn next_event(&mut self) -> SessionEvent;

    /// Close the connection gracefully
    async fn shutdown(&mut self) -> Result<()>;
}

/// Factory for broker sessions
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    /// The session type this connector produces
    type Session: BrokerSession;

    /// Open a new session to `endpoint`
    async fn connect(&self, endpoint: &BrokerEndpoint) -> Result<Self::Session>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
