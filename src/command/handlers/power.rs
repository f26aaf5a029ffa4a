//! Power control directive handler (TurnOn / TurnOff)

use super::HandlerContext;
use crate::publish::{PublishError, PublishRequest};
use crate::registry::DeviceRecord;
use mqtthome_shared::{BridgeError, Directive, ErrorType, EventName, EventPayload, ResponseEnvelope};
use tracing::{debug, error, info, warn};

/// Power operations a control directive can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    TurnOn,
    TurnOff,
}

impl PowerAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "TurnOn" => Some(PowerAction::TurnOn),
            "TurnOff" => Some(PowerAction::TurnOff),
            _ => None,
        }
    }

    /// Payload the device expects for this action
    pub fn message<'a>(&self, device: &'a DeviceRecord) -> &'a str {
        match self {
            PowerAction::TurnOn => &device.on_message,
            PowerAction::TurnOff => &device.off_message,
        }
    }
}

/// Handle `Alexa.PowerController`
///
/// Always produces a response: failures become protocol error events.
pub async fn handle_power_control(ctx: &HandlerContext, directive: &Directive) -> ResponseEnvelope {
    match execute(ctx, directive).await {
        Ok(response) => response,
        Err(e) => error_response(directive, &e),
    }
}

async fn execute(ctx: &HandlerContext, directive: &Directive) -> Result<ResponseEnvelope, BridgeError> {
    let token = directive.control_token();

    if !ctx.accepts_token(token) {
        error!(
            message_id = %directive.header.message_id,
            "[CONTROL] Request failed, invalid access token"
        );
        return Err(BridgeError::InvalidAccessToken(token.to_string()));
    }

    let endpoint_id = directive.endpoint_id().ok_or_else(|| {
        error!("[CONTROL] No endpoint id provided in request");
        BridgeError::MissingEndpointId
    })?;

    if !ctx.health.is_online(endpoint_id, token).await {
        error!(endpoint_id, "[CONTROL] Device offline");
        return Err(BridgeError::DeviceOffline(endpoint_id.to_string()));
    }

    let user = ctx.registry.lookup_by_token(token).await.map_err(|e| {
        error!(endpoint_id, error = %e, "[CONTROL] Registry lookup failed");
        BridgeError::AccessDenied(e.to_string())
    })?;

    let name = directive.header.name.as_str();
    let action = PowerAction::parse(name).ok_or_else(|| {
        error!(endpoint_id, directive = name, "[CONTROL] No supported directive name");
        BridgeError::UnsupportedDirectiveName(name.to_string())
    })?;

    let device = user.device(endpoint_id).ok_or_else(|| {
        error!(endpoint_id, "[CONTROL] Endpoint not registered for this user");
        BridgeError::NoSuchEndpoint(endpoint_id.to_string())
    })?;

    let request = PublishRequest::for_device(device, action.message(device));
    debug!(endpoint_id, ?action, topic = %request.topic, "[CONTROL] Sending command");

    ctx.publisher.publish(&request).await.map_err(|e| {
        warn!(endpoint_id, error = %e, "[CONTROL] Command not delivered");
        match &e {
            PublishError::Unreachable { .. } => BridgeError::PublishUnreachable(e.to_string()),
            PublishError::Failed { .. } => BridgeError::PublishFailed(e.to_string()),
        }
    })?;

    info!(endpoint_id, ?action, "[CONTROL] Command delivered");
    Ok(ResponseEnvelope::success(endpoint_id, directive.correlation_token()))
}

/// Map a failure onto the protocol's error events
fn error_response(directive: &Directive, err: &BridgeError) -> ResponseEnvelope {
    let endpoint_id = directive.endpoint_id();
    let correlation_token = directive.correlation_token();

    match err {
        BridgeError::InvalidAccessToken(_) => ResponseEnvelope::build(
            EventName::InvalidAccessTokenError,
            endpoint_id,
            EventPayload::Empty {},
            correlation_token,
        ),
        BridgeError::MissingEndpointId => ResponseEnvelope::build(
            EventName::UnexpectedInformationReceivedError,
            endpoint_id,
            EventPayload::Fault {
                faulting_parameter: "endpointId".into(),
            },
            correlation_token,
        ),
        BridgeError::DeviceOffline(_) => ResponseEnvelope::build(
            EventName::TargetOfflineError,
            endpoint_id,
            EventPayload::Empty {},
            correlation_token,
        ),
        BridgeError::NoSuchEndpoint(_) => ResponseEnvelope::error(
            endpoint_id,
            ErrorType::NoSuchEndpoint,
            err.to_string(),
            correlation_token,
        ),
        BridgeError::AccessDenied(_)
        | BridgeError::UnsupportedDirectiveName(_)
        | BridgeError::PublishUnreachable(_)
        | BridgeError::PublishFailed(_)
        | BridgeError::UnsupportedNamespace(_)
        | BridgeError::Decode(_) => ResponseEnvelope::error(
            endpoint_id,
            ErrorType::EndpointUnreachable,
            err.to_string(),
            correlation_token,
        ),
    }
}
