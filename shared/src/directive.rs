//! Inbound smart-home directives
//!
//! A directive arrives as a JSON document of the form
//! ```text
//! { "directive": { "header": {..}, "payload": { "scope": {..} }, "endpoint": {..} } }
//! ```
//! Discovery directives carry the access token in `payload.scope`, control
//! directives in `endpoint.scope`.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::protocol;

/// Top-level request wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveRequest {
    pub directive: Directive,
}

impl DirectiveRequest {
    /// Parse a request from its JSON text
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub header: DirectiveHeader,
    #[serde(default)]
    pub payload: DirectivePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<DirectiveEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveHeader {
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub payload_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectivePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

/// Authorization scope carrying the caller's access token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub token: String,
}

/// Routing namespaces understood by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Discovery,
    PowerController,
}

impl Namespace {
    /// Resolve a header namespace, `None` when unsupported
    pub fn parse(namespace: &str) -> Option<Self> {
        match namespace {
            protocol::DISCOVERY_NAMESPACE => Some(Namespace::Discovery),
            protocol::POWER_CONTROLLER_NAMESPACE => Some(Namespace::PowerController),
            _ => None,
        }
    }
}

impl Directive {
    pub fn namespace(&self) -> Option<Namespace> {
        Namespace::parse(&self.header.namespace)
    }

    pub fn correlation_token(&self) -> Option<&str> {
        self.header.correlation_token.as_deref()
    }

    /// Access token of a discovery directive, trimmed (empty when absent)
    pub fn discovery_token(&self) -> &str {
        self.payload
            .scope
            .as_ref()
            .map(|s| s.token.trim())
            .unwrap_or_default()
    }

    /// Access token of a control directive, trimmed (empty when absent)
    pub fn control_token(&self) -> &str {
        self.endpoint
            .as_ref()
            .and_then(|e| e.scope.as_ref())
            .map(|s| s.token.trim())
            .unwrap_or_default()
    }

    /// Target endpoint id; blank ids count as missing
    pub fn endpoint_id(&self) -> Option<&str> {
        self.endpoint
            .as_ref()
            .and_then(|e| e.endpoint_id.as_deref())
            .filter(|id| !id.trim().is_empty())
    }
}
