//! MQTT Home Shared Protocol Types
//!
//! This crate provides the smart-home directive and response types used by
//! the bridge, together with the error kinds every handler reports.

pub mod directive;
pub mod error;
pub mod response;

pub use directive::{
    Directive, DirectiveEndpoint, DirectiveHeader, DirectivePayload, DirectiveRequest, Namespace,
    Scope,
};
pub use error::BridgeError;
pub use response::{
    Capability, CapabilityProperties, DiscoveryEndpoint, EndpointRef, ErrorPayload, ErrorType,
    Event, EventHeader, EventName, EventPayload, ResponseEnvelope, SupportedProperty,
};

/// Fixed protocol constants
pub mod protocol {
    /// Namespace of discovery directives
    pub const DISCOVERY_NAMESPACE: &str = "Alexa.Discovery";

    /// Namespace of power control directives
    pub const POWER_CONTROLLER_NAMESPACE: &str = "Alexa.PowerController";

    /// Namespace of every control response event
    pub const RESPONSE_NAMESPACE: &str = "Alexa";

    /// Payload version stamped on every response
    pub const PAYLOAD_VERSION: &str = "3";

    /// Manufacturer and description advertised for discovered endpoints
    pub const MANUFACTURER_NAME: &str = "MQTT Home";

    /// Capability interface version
    pub const INTERFACE_VERSION: &str = "3";
}
