//! Directive handlers for the supported namespaces

mod discovery;
mod power;

pub use discovery::handle_discovery;
pub use power::handle_power_control;

use std::sync::Arc;

use crate::checks::{AcceptAnyToken, AssumeOnline, DeviceHealth, TokenValidator};
use crate::publish::CommandPublisher;
use crate::registry::DeviceRegistry;

/// Collaborators passed to directive handlers
#[derive(Clone)]
pub struct HandlerContext {
    pub registry: Arc<dyn DeviceRegistry>,
    pub publisher: Arc<dyn CommandPublisher>,
    pub tokens: Arc<dyn TokenValidator>,
    pub health: Arc<dyn DeviceHealth>,
}

impl HandlerContext {
    /// Context with the permissive token and health checks
    pub fn new(registry: Arc<dyn DeviceRegistry>, publisher: Arc<dyn CommandPublisher>) -> Self {
        Self {
            registry,
            publisher,
            tokens: Arc::new(AcceptAnyToken),
            health: Arc::new(AssumeOnline),
        }
    }

    #[cfg(test)]
    pub fn with_token_validator(mut self, tokens: Arc<dyn TokenValidator>) -> Self {
        self.tokens = tokens;
        self
    }

    #[cfg(test)]
    pub fn with_device_health(mut self, health: Arc<dyn DeviceHealth>) -> Self {
        self.health = health;
        self
    }

    /// Presence plus the pluggable validity check
    pub(crate) fn accepts_token(&self, token: &str) -> bool {
        !token.is_empty() && self.tokens.is_valid(token)
    }
}
