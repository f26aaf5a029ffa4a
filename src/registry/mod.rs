//! Device registry access
//!
//! This module handles:
//! - The user and device record model stored by the registry
//! - Looking up the user that owns an access token
//! - Ordering a user's devices by their positional key (`device0`, `device1`, ...)

mod json_table;
#[cfg(test)]
mod memory;

pub use json_table::JsonTableRegistry;
#[cfg(test)]
pub use memory::InMemoryRegistry;

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors returned by a registry lookup
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No user record matches the access token")]
    NotFound,

    #[error("Registry store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// A user record, keyed by its access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub access_token: String,
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceRecord>,
}

/// A device owned by a user; its id is the key in [`UserRecord::devices`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    #[serde(deserialize_with = "port_from_text_or_number")]
    pub port: u16,
    pub topic: String,
    pub on_message: String,
    pub off_message: String,
}

impl UserRecord {
    pub fn device(&self, endpoint_id: &str) -> Option<&DeviceRecord> {
        self.devices.get(endpoint_id)
    }

    /// Devices ordered by the numeric suffix of their key; unnumbered keys go last
    pub fn ordered_devices(&self) -> Vec<(&str, &DeviceRecord)> {
        let mut devices: Vec<(&str, &DeviceRecord)> =
            self.devices.iter().map(|(id, d)| (id.as_str(), d)).collect();
        devices.sort_by_key(|(id, _)| {
            let index = positional_index(id);
            (index.is_none(), index, *id)
        });
        devices
    }
}

fn positional_index(key: &str) -> Option<u64> {
    let stem = key.trim_end_matches(|c: char| c.is_ascii_digit());
    key[stem.len()..].parse().ok()
}

// Ports are stored as strings in existing tables
fn port_from_text_or_number<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid port {:?}", text))),
    }
}

/// An item carrying the `access_token` attribute the registry is keyed by
pub(crate) trait TokenKeyed {
    fn access_token(&self) -> Option<&str>;
}

impl TokenKeyed for UserRecord {
    fn access_token(&self) -> Option<&str> {
        Some(&self.access_token)
    }
}

impl TokenKeyed for serde_json::Value {
    fn access_token(&self) -> Option<&str> {
        self.get("access_token").and_then(serde_json::Value::as_str)
    }
}

/// Equality scan over the `access_token` attribute; the first match wins
pub(crate) fn find_by_token<T, I>(items: I, access_token: &str) -> Result<T, RegistryError>
where
    T: TokenKeyed,
    I: IntoIterator<Item = T>,
{
    let token = access_token.trim();
    if token.is_empty() {
        return Err(RegistryError::NotFound);
    }
    items
        .into_iter()
        .find(|item| item.access_token() == Some(token))
        .ok_or(RegistryError::NotFound)
}

/// Looks up the user that owns an access token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Find the user record for `access_token`; surrounding whitespace is ignored
    async fn lookup_by_token(&self, access_token: &str) -> Result<UserRecord, RegistryError>;
}

#[cfg(test)]
pub(crate) fn test_device(topic: &str) -> DeviceRecord {
    DeviceRecord {
        name: "Lamp".into(),
        kind: "LIGHT".into(),
        address: "127.0.0.1".into(),
        port: 1883,
        topic: topic.into(),
        on_message: "ON".into(),
        off_message: "OFF".into(),
    }
}
