//! Scripted broker transport for exercising the publisher without a network

use crate::transport::traits::{BrokerConnector, BrokerEndpoint, BrokerSession, SessionEvent};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Everything the scripted sessions observed, shared with the test
#[derive(Debug, Default)]
pub struct Observed {
    pub connects: Vec<BrokerEndpoint>,
    pub publishes: Vec<(String, Bytes)>,
    pub shutdowns: usize,
}

/// Connector whose sessions replay a fixed sequence of events
#[derive(Clone)]
pub struct ScriptedConnector {
    script: Vec<SessionEvent>,
    fail_connect: bool,
    fail_publish: bool,
    observed: Arc<Mutex<Observed>>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<SessionEvent>) -> Self {
        Self {
            script,
            fail_connect: false,
            fail_publish: false,
            observed: Arc::new(Mutex::new(Observed::default())),
        }
    }

    /// Broker connects and acknowledges the publish
    pub fn accepting() -> Self {
        Self::new(vec![SessionEvent::Connected, SessionEvent::PublishAcked])
    }

    /// Connection drops before the broker ever answers
    pub fn offline() -> Self {
        Self::new(vec![SessionEvent::Offline {
            reason: "connection refused".into(),
        }])
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub fn observed(&self) -> Arc<Mutex<Observed>> {
        self.observed.clone()
    }
}

pub struct ScriptedSession {
    events: VecDeque<SessionEvent>,
    fail_publish: bool,
    observed: Arc<Mutex<Observed>>,
}

#[async_trait]
impl BrokerSession for ScriptedSession {
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<()> {
        if self.fail_publish {
            return Err(anyhow!("request channel closed"));
        }
        self.observed
            .lock()
            .unwrap()
            .publishes
            .push((topic.to_string(), payload));
        Ok(())
    }

    async fn next_event(&mut self) -> SessionEvent {
        self.events.pop_front().unwrap_or(SessionEvent::Offline {
            reason: "script exhausted".into(),
        })
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.observed.lock().unwrap().shutdowns += 1;
        Ok(())
    }
}

#[async_trait]
impl BrokerConnector for ScriptedConnector {
    type Session = ScriptedSession;

    async fn connect(&self, endpoint: &BrokerEndpoint) -> Result<Self::Session> {
        self.observed.lock().unwrap().connects.push(endpoint.clone());
        if self.fail_connect {
            return Err(anyhow!("invalid broker address"));
        }
        Ok(ScriptedSession {
            events: self.script.iter().cloned().collect(),
            fail_publish: self.fail_publish,
            observed: self.observed.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }
}
