pub mod mqtt;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use mqtt::MqttConnector;
pub use traits::{BrokerConnector, BrokerEndpoint, BrokerSession, DeliveryQos, SessionEvent};
