//! Process-memory cache of unwrapped data keys.

use fieldseal_crypto::DataKey;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Unwrapped DEKs keyed by key id.
///
/// Lives and dies with the owning manager — nothing here is ever persisted,
/// and the `DataKey` entries zeroize themselves on drop.
#[derive(Default)]
pub(crate) struct DekCache {
    deks: RwLock<HashMap<Uuid, DataKey>>,
}

impl DekCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, key_id: Uuid, dek: DataKey) {
        self.deks.write().await.insert(key_id, dek);
    }

    pub async fn get(&self, key_id: &Uuid) -> Option<DataKey> {
        self.deks.read().await.get(key_id).cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.deks.read().await.len()
    }
}
