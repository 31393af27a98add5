//! The persisted data key document.

use chrono::{DateTime, Utc};
use fieldseal_kms::MasterKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle marker for a data key.
///
/// Disabled keys remain resolvable for decryption of existing ciphertexts
/// but are refused for new encryption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Disabled,
}

/// A data encryption key as stored in the key vault collection.
///
/// `key_material` is always the wrapped form — raw key bytes never reach
/// this type. `master_key` records which provider (and which of its keys)
/// performed the wrapping, which is required to unwrap later.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataKeyDocument {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub key_material: Vec<u8>,
    pub creation_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub status: KeyStatus,
    pub master_key: MasterKey,
    /// Human-readable aliases, unique across the vault.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_alt_names: Vec<String>,
}

impl DataKeyDocument {
    /// Builds a fresh document around wrapped key material: new random id,
    /// active status, both timestamps set to now.
    pub fn new(master_key: MasterKey, key_material: Vec<u8>, key_alt_names: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key_material,
            creation_date: now,
            update_date: now,
            status: KeyStatus::Active,
            master_key,
            key_alt_names,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }
}
