//! Directive router - dispatches inbound directives by namespace

use super::handlers::{self, HandlerContext};
use mqtthome_shared::{BridgeError, DirectiveRequest, Namespace, ResponseEnvelope};
use tracing::{debug, error, instrument};

/// Routes each directive to the discovery or power control handler
pub struct DirectiveRouter {
    ctx: HandlerContext,
}

impl DirectiveRouter {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    /// Handle one directive and return its response
    ///
    /// Errors are invocation-level failures with no response body.
    #[instrument(
        name = "directive",
        skip_all,
        fields(
            namespace = %request.directive.header.namespace,
            directive_name = %request.directive.header.name,
            message_id = %request.directive.header.message_id,
        )
    )]
    pub async fn route(&self, request: &DirectiveRequest) -> Result<ResponseEnvelope, BridgeError> {
        let directive = &request.directive;
        debug!(?directive, "[REQUEST] Received directive");

        let result = match directive.namespace() {
            Some(Namespace::Discovery) => handlers::handle_discovery(&self.ctx, directive).await,
            Some(Namespace::PowerController) => {
                Ok(handlers::handle_power_control(&self.ctx, directive).await)
            }
            None => {
                error!("[REQUEST] No supported namespace");
                Err(BridgeError::UnsupportedNamespace(directive.header.namespace.clone()))
            }
        };

        if let Ok(response) = &result {
            debug!(?response, "[RESPONSE] Responding");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handlers::fixtures::user_with_devices;
    use crate::publish::{MockCommandPublisher, SessionPublisher};
    use crate::registry::{InMemoryRegistry, MockDeviceRegistry};
    use crate::transport::testing::ScriptedConnector;
    use crate::transport::BrokerEndpoint;
    use bytes::Bytes;
    use mqtthome_shared::ErrorType;
    use serde_json::json;
    use std::sync::Arc;

    fn request(value: serde_json::Value) -> DirectiveRequest {
        serde_json::from_value(value).unwrap()
    }

    fn turn_on_device0() -> DirectiveRequest {
        request(json!({
            "directive": {
                "header": {
                    "namespace": "Alexa.PowerController",
                    "name": "TurnOn",
                    "payloadVersion": "3",
                    "messageId": "msg-1",
                    "correlationToken": "ct-1"
                },
                "endpoint": {
                    "endpointId": "device0",
                    "scope": { "type": "BearerToken", "token": "abc" }
                },
                "payload": {}
            }
        }))
    }

    fn router(connector: ScriptedConnector) -> DirectiveRouter {
        let registry = InMemoryRegistry::new(vec![user_with_devices(2)]);
        DirectiveRouter::new(HandlerContext::new(
            Arc::new(registry),
            Arc::new(SessionPublisher::new(connector)),
        ))
    }

    #[tokio::test]
    async fn test_unknown_namespace_touches_nothing() {
        // Mocks without expectations panic if called
        let router = DirectiveRouter::new(HandlerContext::new(
            Arc::new(MockDeviceRegistry::new()),
            Arc::new(MockCommandPublisher::new()),
        ));

        let err = router
            .route(&request(json!({
                "directive": {
                    "header": {
                        "namespace": "Alexa.ThermostatController",
                        "name": "SetTargetTemperature",
                        "messageId": "msg-3"
                    },
                    "payload": {}
                }
            })))
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::UnsupportedNamespace(ns) if ns == "Alexa.ThermostatController"));
    }

    #[tokio::test]
    async fn test_turn_on_end_to_end() {
        let connector = ScriptedConnector::accepting();
        let observed = connector.observed();

        let response = router(connector).route(&turn_on_device0()).await.unwrap();

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["event"]["header"]["name"], "Response");
        assert_eq!(value["event"]["header"]["correlationToken"], "ct-1");
        assert_eq!(value["event"]["endpoint"]["endpointId"], "device0");
        assert_eq!(value["event"]["payload"], json!({}));

        let observed = observed.lock().unwrap();
        assert_eq!(observed.connects, vec![BrokerEndpoint::new("10.0.0.2", 1883)]);
        assert_eq!(
            observed.publishes,
            vec![("home/device0".to_string(), Bytes::from_static(b"ON"))]
        );
        assert_eq!(observed.shutdowns, 1);
    }

    #[tokio::test]
    async fn test_offline_broker_end_to_end() {
        let connector = ScriptedConnector::offline();
        let observed = connector.observed();

        let response = router(connector).route(&turn_on_device0()).await.unwrap();

        assert_eq!(response.name(), "ErrorResponse");
        assert_eq!(response.error_type(), Some(ErrorType::EndpointUnreachable));
        assert_eq!(response.event.header.correlation_token.as_deref(), Some("ct-1"));

        let observed = observed.lock().unwrap();
        assert!(observed.publishes.is_empty());
        assert_eq!(observed.shutdowns, 1);
    }

    #[tokio::test]
    async fn test_discovery_end_to_end() {
        let connector = ScriptedConnector::accepting();
        let observed = connector.observed();

        let response = router(connector)
            .route(&request(json!({
                "directive": {
                    "header": {
                        "namespace": "Alexa.Discovery",
                        "name": "Discover",
                        "payloadVersion": "3",
                        "messageId": "msg-2"
                    },
                    "payload": { "scope": { "type": "BearerToken", "token": "abc" } }
                }
            })))
            .await
            .unwrap();

        let value = serde_json::to_value(&response).unwrap();
        let endpoints = value["event"]["payload"]["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0]["endpointId"], "device0");
        assert_eq!(endpoints[1]["endpointId"], "device1");

        // Discovery never publishes
        assert!(observed.lock().unwrap().connects.is_empty());
    }

    #[tokio::test]
    async fn test_discovery_unknown_token_is_denied() {
        let err = router(ScriptedConnector::accepting())
            .route(&request(json!({
                "directive": {
                    "header": { "namespace": "Alexa.Discovery", "name": "Discover", "messageId": "m" },
                    "payload": { "scope": { "type": "BearerToken", "token": "nobody" } }
                }
            })))
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::AccessDenied(_)));
    }
}
