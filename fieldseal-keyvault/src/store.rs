//! Thin repository over the collection handle.

use crate::collection::KeyVaultCollection;
use crate::document::DataKeyDocument;
use crate::error::{KeyVaultError, KeyVaultResult};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Typed insert/lookup over the key vault collection.
///
/// Pure persistence plumbing: no cryptography happens here, and the
/// collection handle is shared, not owned — dropping the store releases the
/// reference without closing anything.
#[derive(Clone)]
pub struct KeyVaultStore {
    collection: Arc<dyn KeyVaultCollection>,
}

impl KeyVaultStore {
    pub fn new(collection: Arc<dyn KeyVaultCollection>) -> Self {
        Self { collection }
    }

    /// Writes a well-formed data key document; returns its id.
    pub async fn insert(&self, document: &DataKeyDocument) -> KeyVaultResult<Uuid> {
        let value = serde_json::to_value(document)
            .map_err(|e| KeyVaultError::Write(format!("failed to encode key document: {e}")))?;
        self.collection.insert_one(value).await?;
        debug!("inserted key document {}", document.id);
        Ok(document.id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> KeyVaultResult<Option<DataKeyDocument>> {
        self.fetch(serde_json::json!({ "_id": id })).await
    }

    pub async fn find_by_alt_name(&self, name: &str) -> KeyVaultResult<Option<DataKeyDocument>> {
        self.fetch(serde_json::json!({ "keyAltNames": name })).await
    }

    async fn fetch(&self, filter: serde_json::Value) -> KeyVaultResult<Option<DataKeyDocument>> {
        match self.collection.find_one(filter).await? {
            Some(value) => {
                let document = serde_json::from_value(value)
                    .map_err(|e| KeyVaultError::Malformed(e.to_string()))?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }
}
