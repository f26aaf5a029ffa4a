//! In-process registry holding a fixed set of user records

use async_trait::async_trait;

use super::{find_by_token, DeviceRegistry, RegistryError, UserRecord};

#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    users: Vec<UserRecord>,
}

impl InMemoryRegistry {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryRegistry {
    async fn lookup_by_token(&self, access_token: &str) -> Result<UserRecord, RegistryError> {
        find_by_token(self.users.iter().cloned(), access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_device;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_lookup() {
        let registry = InMemoryRegistry::new(vec![UserRecord {
            access_token: "abc".into(),
            devices: BTreeMap::from([("device0".to_string(), test_device("home/device0"))]),
        }]);

        let user = registry.lookup_by_token("abc").await.unwrap();
        assert!(user.device("device0").is_some());

        assert!(matches!(
            registry.lookup_by_token("abd").await,
            Err(RegistryError::NotFound)
        ));
    }
}
