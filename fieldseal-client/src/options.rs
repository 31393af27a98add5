//! Options structs for the three operations.

use fieldseal_crypto::Algorithm;
use fieldseal_kms::MasterKey;
use uuid::Uuid;

/// Options for `create_data_key`.
#[derive(Clone, Debug, Default)]
pub struct DataKeyOptions {
    /// Provider-specific master key locator. Required for every provider
    /// except `local`, whose master key is the configured secret.
    pub master_key: Option<MasterKey>,
    /// Aliases to register for the new key; must be unique across the vault.
    pub key_alt_names: Vec<String>,
}

impl DataKeyOptions {
    pub fn with_master_key(master_key: MasterKey) -> Self {
        Self {
            master_key: Some(master_key),
            ..Self::default()
        }
    }

    pub fn key_alt_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.key_alt_names = names.into_iter().collect();
        self
    }
}

/// Options for `encrypt`. Exactly one of `key_id`/`key_alt_name` selects
/// the data key; supplying both or neither is an argument error.
#[derive(Clone, Debug)]
pub struct EncryptOptions {
    pub algorithm: Algorithm,
    pub key_id: Option<Uuid>,
    pub key_alt_name: Option<String>,
}

impl EncryptOptions {
    pub fn with_key_id(algorithm: Algorithm, key_id: Uuid) -> Self {
        Self {
            algorithm,
            key_id: Some(key_id),
            key_alt_name: None,
        }
    }

    pub fn with_key_alt_name(algorithm: Algorithm, key_alt_name: impl Into<String>) -> Self {
        Self {
            algorithm,
            key_id: None,
            key_alt_name: Some(key_alt_name.into()),
        }
    }
}
