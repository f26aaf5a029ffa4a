//! Registry backed by a JSON table of user records
//!
//! The table is an array of items shaped like the exported user table:
//! ```text
//! [ { "access_token": "..", "devices": { "device0": { "name": .., "port": "1883", .. } } } ]
//! ```
//! The file is re-read on every lookup so edits apply to the next invocation.
//! Only the matching item is decoded into a [`UserRecord`]; other users'
//! records never affect a lookup.

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{find_by_token, DeviceRegistry, RegistryError, UserRecord};

pub struct JsonTableRegistry {
    path: PathBuf,
}

impl JsonTableRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn scan(&self) -> anyhow::Result<Vec<Value>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read user table {}", self.path.display()))?;
        let items: Vec<Value> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse user table {}", self.path.display()))?;
        Ok(items)
    }
}

#[async_trait]
impl DeviceRegistry for JsonTableRegistry {
    async fn lookup_by_token(&self, access_token: &str) -> Result<UserRecord, RegistryError> {
        let items = self.scan().await.map_err(|e| {
            warn!(error = %format!("{:#}", e), "[REGISTRY] Scan failed");
            RegistryError::Store(e)
        })?;

        debug!(count = items.len(), "[REGISTRY] Scanned user table");

        let item = find_by_token(items, access_token)?;
        let user: UserRecord = serde_json::from_value(item)
            .with_context(|| format!("invalid user record in {}", self.path.display()))
            .map_err(|e| {
                warn!(error = %format!("{:#}", e), "[REGISTRY] Matching record rejected");
                RegistryError::Store(e)
            })?;
        debug!(devices = user.devices.len(), "[REGISTRY] Found user record");
        Ok(user)
    }
}
