//! Publisher driving one broker session per command

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{CommandPublisher, PublishError, PublishRequest};
use crate::transport::{BrokerConnector, BrokerSession, SessionEvent};

/// Publishes through a fresh session from `C` on every call
pub struct SessionPublisher<C> {
    connector: C,
}

impl<C: BrokerConnector> SessionPublisher<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

/// Wait for the connect, publish once, then wait for the acknowledgment
async fn deliver<S: BrokerSession>(
    session: &mut S,
    request: &PublishRequest,
) -> Result<(), PublishError> {
    let mut published = false;

    loop {
        match session.next_event().await {
            SessionEvent::Connected if !published => {
                debug!(topic = %request.topic, "[MQTT] Connected, publishing");
                session
                    .publish(&request.topic, request.message.clone())
                    .await
                    .map_err(|e| PublishError::Failed {
                        topic: request.topic.clone(),
                        reason: format!("{:#}", e),
                    })?;
                published = true;
            }
            SessionEvent::Connected => {}
            SessionEvent::PublishAcked if published => return Ok(()),
            SessionEvent::PublishAcked => {}
            SessionEvent::Offline { reason } if published => {
                return Err(PublishError::Failed {
                    topic: request.topic.clone(),
                    reason: format!("connection lost before acknowledgment: {}", reason),
                });
            }
            SessionEvent::Offline { reason } => {
                return Err(PublishError::Unreachable {
                    endpoint: request.endpoint.clone(),
                    reason,
                });
            }
        }
    }
}

#[async_trait]
impl<C: BrokerConnector> CommandPublisher for SessionPublisher<C> {
    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError> {
        let mut session = self
            .connector
            .connect(&request.endpoint)
            .await
            .map_err(|e| PublishError::Unreachable {
                endpoint: request.endpoint.clone(),
                reason: format!("{:#}", e),
            })?;

        let outcome = deliver(&mut session, request).await;

        if let Err(e) = session.shutdown().await {
            warn!(broker = %request.endpoint, error = %format!("{:#}", e), "[MQTT] Disconnect failed");
        }

        match &outcome {
            Ok(()) => info!(
                broker = %request.endpoint,
                topic = %request.topic,
                transport = self.connector.name(),
                "[MQTT] Message published"
            ),
            Err(e) => warn!(broker = %request.endpoint, error = %e, "[MQTT] Delivery failed"),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ScriptedConnector;
    use crate::transport::BrokerEndpoint;
    use bytes::Bytes;

    fn request() -> PublishRequest {
        PublishRequest {
            endpoint: BrokerEndpoint::new("10.0.0.2", 1883),
            topic: "home/device0".into(),
            message: Bytes::from_static(b"ON"),
        }
    }

    #[tokio::test]
    async fn test_publish_acknowledged() {
        let connector = ScriptedConnector::accepting();
        let observed = connector.observed();
        let publisher = SessionPublisher::new(connector);

        publisher.publish(&request()).await.unwrap();

        let observed = observed.lock().unwrap();
        assert_eq!(observed.connects, vec![BrokerEndpoint::new("10.0.0.2", 1883)]);
        assert_eq!(
            observed.publishes,
            vec![("home/device0".to_string(), Bytes::from_static(b"ON"))]
        );
        assert_eq!(observed.shutdowns, 1);
    }

    #[tokio::test]
    async fn test_offline_before_connect_is_unreachable() {
        let connector = ScriptedConnector::offline();
        let observed = connector.observed();
        let publisher = SessionPublisher::new(connector);

        let err = publisher.publish(&request()).await.unwrap_err();
        assert!(matches!(err, PublishError::Unreachable { .. }));

        let observed = observed.lock().unwrap();
        assert!(observed.publishes.is_empty());
        assert_eq!(observed.shutdowns, 1);
    }

    #[tokio::test]
    async fn test_offline_after_publish_is_failure() {
        let connector = ScriptedConnector::new(vec![
            SessionEvent::Connected,
            SessionEvent::Offline {
                reason: "reset by peer".into(),
            },
        ]);
        let observed = connector.observed();
        let publisher = SessionPublisher::new(connector);

        let err = publisher.publish(&request()).await.unwrap_err();
        assert!(matches!(err, PublishError::Failed { .. }));
        assert_eq!(observed.lock().unwrap().publishes.len(), 1);
        assert_eq!(observed.lock().unwrap().shutdowns, 1);
    }

    #[tokio::test]
    async fn test_publish_error_still_closes_once() {
        let connector = ScriptedConnector::accepting().failing_publish();
        let observed = connector.observed();
        let publisher = SessionPublisher::new(connector);

        let err = publisher.publish(&request()).await.unwrap_err();
        assert!(matches!(err, PublishError::Failed { .. }));
        assert_eq!(observed.lock().unwrap().shutdowns, 1);
    }

    #[tokio::test]
    async fn test_repeated_connect_publishes_once() {
        let connector = ScriptedConnector::new(vec![
            SessionEvent::Connected,
            SessionEvent::Connected,
            SessionEvent::PublishAcked,
        ]);
        let observed = connector.observed();
        let publisher = SessionPublisher::new(connector);

        publisher.publish(&request()).await.unwrap();
        assert_eq!(observed.lock().unwrap().publishes.len(), 1);
    }

    #[tokio::test]
    async fn test_connect_error_is_unreachable() {
        let connector = ScriptedConnector::accepting().failing_connect();
        let observed = connector.observed();
        let publisher = SessionPublisher::new(connector);

        let err = publisher.publish(&request()).await.unwrap_err();
        assert!(matches!(err, PublishError::Unreachable { .. }));
        // No session was opened, so there is nothing to close
        assert_eq!(observed.lock().unwrap().shutdowns, 0);
    }
}
