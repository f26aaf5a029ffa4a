//! Bridge configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `MQTTHOME_*` environment variables.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transport::DeliveryQos;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// JSON table of user records, keyed by access token
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Client identifier presented to every device broker
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Publish QoS level (0, 1 or 2)
    #[serde(default = "default_qos")]
    pub qos: u8,

    /// MQTT keep-alive interval in seconds
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Upper bound on flushing the DISCONNECT packet
    #[serde(default = "default_disconnect_timeout_ms")]
    pub disconnect_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("mqtthome-users.json")
}

fn default_client_id() -> String {
    "MQTT Home".to_string()
}

fn default_qos() -> u8 {
    1
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_disconnect_timeout_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            client_id: default_client_id(),
            qos: default_qos(),
            keep_alive_secs: default_keep_alive_secs(),
            disconnect_timeout_ms: default_disconnect_timeout_ms(),
            log_level: default_log_level(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from an optional file plus the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: BridgeConfig = builder
            .add_source(Environment::with_prefix("MQTTHOME").try_parsing(true))
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("failed to parse configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the MQTT client would refuse at connect time
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_id.starts_with(char::is_whitespace) {
            bail!("invalid client_id {:?}", self.client_id);
        }
        if self.keep_alive_secs < 5 {
            bail!("keep_alive_secs must be at least 5, got {}", self.keep_alive_secs);
        }
        self.delivery_qos()?;
        Ok(())
    }

    pub fn delivery_qos(&self) -> Result<DeliveryQos> {
        DeliveryQos::from_level(self.qos).with_context(|| format!("invalid qos level {}", self.qos))
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.disconnect_timeout_ms)
    }
}
