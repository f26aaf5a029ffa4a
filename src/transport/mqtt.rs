//! MQTT transport implementation over rumqttc
//!
//! Each session owns its own client and event loop. Sessions use plain TCP,
//! so no server certificate is ever validated.

use crate::config::BridgeConfig;
use crate::transport::traits::{BrokerConnector, BrokerEndpoint, BrokerSession, DeliveryQos, SessionEvent};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Capacity of the client request channel; a session queues one publish
const REQUEST_CAPACITY: usize = 10;

fn mqtt_qos(qos: DeliveryQos) -> QoS {
    match qos {
        DeliveryQos::AtMostOnce => QoS::AtMostOnce,
        DeliveryQos::AtLeastOnce => QoS::AtLeastOnce,
        DeliveryQos::ExactlyOnce => QoS::ExactlyOnce,
    }
}

/// Opens one MQTT session per publish
#[derive(Debug, Clone)]
pub struct MqttConnector {
    client_id: String,
    qos: DeliveryQos,
    keep_alive: Duration,
    disconnect_timeout: Duration,
}

impl MqttConnector {
    #[cfg(test)]
    pub fn new(client_id: impl Into<String>, qos: DeliveryQos) -> Self {
        Self {
            client_id: client_id.into(),
            qos,
            keep_alive: Duration::from_secs(30),
            disconnect_timeout: Duration::from_secs(1),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        Ok(Self {
            client_id: config.client_id.clone(),
            qos: config.delivery_qos()?,
            keep_alive: config.keep_alive(),
            disconnect_timeout: config.disconnect_timeout(),
        })
    }
}

#[async_trait]
impl BrokerConnector for MqttConnector {
    type Session = MqttSession;

    async fn connect(&self, endpoint: &BrokerEndpoint) -> Result<Self::Session> {
        let mut options = MqttOptions::new(self.client_id.as_str(), endpoint.host.as_str(), endpoint.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);

        // The event loop dials lazily on its first poll
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        debug!(broker = %endpoint, client_id = %self.client_id, "[MQTT] Session created");

        Ok(MqttSession {
            client,
            eventloop,
            qos: self.qos,
            connected: false,
            disconnect_timeout: self.disconnect_timeout,
            endpoint: endpoint.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "MQTT"
    }
}

/// A transient connection to one device broker
pub struct MqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
    qos: DeliveryQos,
    connected: bool,
    disconnect_timeout: Duration,
    endpoint: BrokerEndpoint,
}

impl MqttSession {
    fn is_publish_ack(&self, event: &Event) -> bool {
        match (self.qos, event) {
            (DeliveryQos::AtMostOnce, Event::Outgoing(Outgoing::Publish(_))) => true,
            (DeliveryQos::AtLeastOnce, Event::Incoming(Packet::PubAck(_))) => true,
            (DeliveryQos::ExactlyOnce, Event::Incoming(Packet::PubComp(_))) => true,
            _ => false,
        }
    }
}

#[async_trait]
impl BrokerSession for MqttSession {
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<()> {
        self.client
            .publish(topic, mqtt_qos(self.qos), false, payload.to_vec())
            .await
            .with_context(|| format!("failed to queue publish to {}", topic))
    }

    async fn next_event(&mut self) -> SessionEvent {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    self.connected = true;
                    return SessionEvent::Connected;
                }
                Ok(event) if self.is_publish_ack(&event) => {
                    return SessionEvent::PublishAcked;
                }
                Ok(event) => {
                    trace!(broker = %self.endpoint, ?event, "[MQTT] Event");
                }
                Err(e) => {
                    self.connected = false;
                    return SessionEvent::Offline {
                        reason: e.to_string(),
                    };
                }
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        // Never dialed or already dropped: nothing to flush
        if !self.connected {
            return Ok(());
        }
        self.connected = false;

        self.client
            .disconnect()
            .await
            .context("failed to queue MQTT disconnect")?;

        let eventloop = &mut self.eventloop;
        let drain = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break Ok(()),
                    Ok(_) => continue,
                    Err(e) => break Err(e),
                }
            }
        };

        match timeout(self.disconnect_timeout, drain).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                debug!(broker = %self.endpoint, error = %e, "[MQTT] Connection closed during disconnect");
                Ok(())
            }
            Err(_) => Err(anyhow!("timed out disconnecting from {}", self.endpoint)),
        }
    }
}
