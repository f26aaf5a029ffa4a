//! Pluggable capability checks consulted by the directive handlers
//!
//! Both checks ship with permissive defaults; a deployment that can verify
//! tokens or probe device liveness swaps in its own implementation.

use async_trait::async_trait;
use tracing::debug;

/// Decides whether a presented access token may be used
#[cfg_attr(test, mockall::automock)]
pub trait TokenValidator: Send + Sync {
    fn is_valid(&self, token: &str) -> bool;
}

/// Reports whether a device is currently reachable
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceHealth: Send + Sync {
    async fn is_online(&self, endpoint_id: &str, access_token: &str) -> bool;
}

/// Accepts every non-empty token; presence is checked by the handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyToken;

impl TokenValidator for AcceptAnyToken {
    fn is_valid(&self, _token: &str) -> bool {
        true
    }
}

/// Treats every device as online
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeOnline;

#[async_trait]
impl DeviceHealth for AssumeOnline {
    async fn is_online(&self, endpoint_id: &str, _access_token: &str) -> bool {
        debug!(endpoint_id, "[HEALTH] assuming device is online");
        true
    }
}
