//! Discovery directive handler

use super::HandlerContext;
use mqtthome_shared::{BridgeError, Directive, DiscoveryEndpoint, ResponseEnvelope};
use tracing::{error, info};

/// Handle `Alexa.Discovery` / `Discover`
///
/// Token and registry failures are returned as errors rather than response
/// bodies; the caller decides how to surface them.
pub async fn handle_discovery(
    ctx: &HandlerContext,
    directive: &Directive,
) -> Result<ResponseEnvelope, BridgeError> {
    let token = directive.discovery_token();

    if !ctx.accepts_token(token) {
        error!(
            message_id = %directive.header.message_id,
            "[DISCOVERY] Request failed, invalid access token"
        );
        return Err(BridgeError::InvalidAccessToken(token.to_string()));
    }

    let user = ctx.registry.lookup_by_token(token).await.map_err(|e| {
        error!(
            message_id = %directive.header.message_id,
            error = %e,
            "[DISCOVERY] Registry lookup failed"
        );
        BridgeError::AccessDenied(e.to_string())
    })?;

    let endpoints: Vec<DiscoveryEndpoint> = user
        .ordered_devices()
        .into_iter()
        .map(|(endpoint_id, device)| {
            DiscoveryEndpoint::power_switch(endpoint_id, &device.name, &device.kind)
        })
        .collect();

    info!(count = endpoints.len(), "[DISCOVERY] Discovered endpoints");

    Ok(ResponseEnvelope::discovery(endpoints, directive.correlation_token()))
}
