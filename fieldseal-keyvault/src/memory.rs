//! In-process collection backing, used by tests and embedders.

use crate::collection::KeyVaultCollection;
use crate::error::{KeyVaultError, KeyVaultResult};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// An in-memory [`KeyVaultCollection`] enforcing the vault's uniqueness
/// invariants (`_id` and key alt names) the way a served collection's
/// unique indexes would.
#[derive(Default)]
pub struct MemoryCollection {
    documents: RwLock<Vec<serde_json::Value>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn alt_names(document: &serde_json::Value) -> Vec<&str> {
    document["keyAltNames"]
        .as_array()
        .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
        .unwrap_or_default()
}

fn matches(document: &serde_json::Value, filter: &serde_json::Value) -> bool {
    let Some(entries) = filter.as_object() else {
        return false;
    };
    entries.iter().all(|(field, expected)| {
        let actual = &document[field];
        actual == expected
            || actual
                .as_array()
                .is_some_and(|items| items.contains(expected))
    })
}

#[async_trait]
impl KeyVaultCollection for MemoryCollection {
    async fn insert_one(&self, document: serde_json::Value) -> KeyVaultResult<()> {
        let mut documents = self.documents.write().await;

        let id = document["_id"]
            .as_str()
            .ok_or_else(|| KeyVaultError::Write("document has no _id".to_string()))?
            .to_string();

        if documents.iter().any(|d| d["_id"].as_str() == Some(&id)) {
            return Err(KeyVaultError::Duplicate(format!("_id {id} already exists")));
        }

        let new_names = alt_names(&document);
        for existing in documents.iter() {
            if let Some(clash) = alt_names(existing).iter().find(|n| new_names.contains(n)) {
                return Err(KeyVaultError::Duplicate(format!(
                    "key alt name {clash} already exists"
                )));
            }
        }

        documents.push(document);
        Ok(())
    }

    async fn find_one(
        &self,
        filter: serde_json::Value,
    ) -> KeyVaultResult<Option<serde_json::Value>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| matches(d, &filter)).cloned())
    }
}
