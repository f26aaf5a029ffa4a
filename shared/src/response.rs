//! Response envelopes returned to the voice assistant
//!
//! Every response is built fresh per request with a new message id:
//! ```text
//! { "event": { "header": {..}, "endpoint": { "endpointId": .. }, "payload": {..} } }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::protocol;

/// Names of the response events the bridge emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventName {
    Response,
    ErrorResponse,
    InvalidAccessTokenError,
    UnexpectedInformationReceivedError,
    TargetOfflineError,
    DiscoverResponse,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Response => "Response",
            EventName::ErrorResponse => "ErrorResponse",
            EventName::InvalidAccessTokenError => "InvalidAccessTokenError",
            EventName::UnexpectedInformationReceivedError => "UnexpectedInformationReceivedError",
            EventName::TargetOfflineError => "TargetOfflineError",
            EventName::DiscoverResponse => "Discover.Response",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub header: EventHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointRef>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHeader {
    pub namespace: String,
    pub name: String,
    pub payload_version: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRef {
    pub endpoint_id: String,
}

/// Event payload variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Discovery { endpoints: Vec<DiscoveryEndpoint> },
    Error(ErrorPayload),
    #[serde(rename_all = "camelCase")]
    Fault { faulting_parameter: String },
    Empty {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "type")]
    pub kind: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    EndpointUnreachable,
    NoSuchEndpoint,
}

/// An endpoint advertised in a discovery response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryEndpoint {
    pub endpoint_id: String,
    pub manufacturer_name: String,
    pub friendly_name: String,
    pub description: String,
    pub display_categories: Vec<String>,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(rename = "type")]
    pub kind: String,
    pub interface: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<CapabilityProperties>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityProperties {
    pub supported: Vec<SupportedProperty>,
    pub proactively_reported: bool,
    pub retrievable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedProperty {
    pub name: String,
}

impl DiscoveryEndpoint {
    /// Create an on/off switchable endpoint with the fixed capability set
    pub fn power_switch(
        endpoint_id: impl Into<String>,
        friendly_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            manufacturer_name: protocol::MANUFACTURER_NAME.into(),
            friendly_name: friendly_name.into(),
            description: protocol::MANUFACTURER_NAME.into(),
            display_categories: vec![category.into()],
            capabilities: vec![Capability::alexa(), Capability::power_controller()],
        }
    }
}

impl Capability {
    /// Generic `Alexa` interface every endpoint must declare
    pub fn alexa() -> Self {
        Self {
            kind: "AlexaInterface".into(),
            interface: protocol::RESPONSE_NAMESPACE.into(),
            version: protocol::INTERFACE_VERSION.into(),
            properties: None,
        }
    }

    /// Power control, neither retrievable nor proactively reported
    pub fn power_controller() -> Self {
        Self {
            kind: "AlexaInterface".into(),
            interface: protocol::POWER_CONTROLLER_NAMESPACE.into(),
            version: protocol::INTERFACE_VERSION.into(),
            properties: Some(CapabilityProperties {
                supported: vec![SupportedProperty {
                    name: "powerState".into(),
                }],
                proactively_reported: false,
                retrievable: false,
            }),
        }
    }
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builder helpers for creating responses
impl ResponseEnvelope {
    /// Build a control response event in the `Alexa` namespace
    pub fn build(
        name: EventName,
        endpoint_id: Option<&str>,
        payload: EventPayload,
        correlation_token: Option<&str>,
    ) -> Self {
        Self {
            event: Event {
                header: EventHeader {
                    namespace: protocol::RESPONSE_NAMESPACE.into(),
                    name: name.as_str().into(),
                    payload_version: protocol::PAYLOAD_VERSION.into(),
                    message_id: new_message_id(),
                    correlation_token: correlation_token.map(str::to_owned),
                },
                endpoint: endpoint_id.map(|id| EndpointRef {
                    endpoint_id: id.into(),
                }),
                payload,
            },
        }
    }

    /// Bare success acknowledgment
    pub fn success(endpoint_id: &str, correlation_token: Option<&str>) -> Self {
        Self::build(
            EventName::Response,
            Some(endpoint_id),
            EventPayload::Empty {},
            correlation_token,
        )
    }

    /// Typed `ErrorResponse`
    pub fn error(
        endpoint_id: Option<&str>,
        kind: ErrorType,
        message: impl Into<String>,
        correlation_token: Option<&str>,
    ) -> Self {
        Self::build(
            EventName::ErrorResponse,
            endpoint_id,
            EventPayload::Error(ErrorPayload {
                kind,
                message: Some(message.into()),
            }),
            correlation_token,
        )
    }

    /// Discovery response listing every endpoint, without an endpoint field
    pub fn discovery(endpoints: Vec<DiscoveryEndpoint>, correlation_token: Option<&str>) -> Self {
        Self {
            event: Event {
                header: EventHeader {
                    namespace: protocol::DISCOVERY_NAMESPACE.into(),
                    name: EventName::DiscoverResponse.as_str().into(),
                    payload_version: protocol::PAYLOAD_VERSION.into(),
                    message_id: new_message_id(),
                    correlation_token: correlation_token.map(str::to_owned),
                },
                endpoint: None,
                payload: EventPayload::Discovery { endpoints },
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.event.header.name
    }

    pub fn endpoint_id(&self) -> Option<&str> {
        self.event.endpoint.as_ref().map(|e| e.endpoint_id.as_str())
    }

    /// Error type carried by an `ErrorResponse`, if any
    pub fn error_type(&self) -> Option<ErrorType> {
        match &self.event.payload {
            EventPayload::Error(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
