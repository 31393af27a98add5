//! The client-side encryption manager.

use crate::cache::DekCache;
use crate::error::{ClientEncryptionError, ClientResult};
use crate::options::{DataKeyOptions, EncryptOptions};
use fieldseal_crypto::DataKey;
use fieldseal_keyvault::{DataKeyDocument, KeyVaultCollection, KeyVaultStore};
use fieldseal_kms::{KmsClient, KmsProvider, KmsProviders, MasterKey};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Construction-time configuration for [`ClientEncryption`].
pub struct ClientEncryptionOptions {
    /// The key vault collection handle. Shared, not transferred: the
    /// manager releases its reference on drop and never closes it.
    pub key_vault: Arc<dyn KeyVaultCollection>,
    /// Per-provider credentials; immutable for the manager's lifetime.
    pub kms_providers: KmsProviders,
}

/// Explicit client-side field encryption: data key management plus
/// envelope encrypt/decrypt of individual values.
///
/// Constructed once per application configuration via [`ClientEncryption::new`]
/// and dropped when the application is done with it; there is no other
/// lifecycle. Operations are independent `&self` calls, safe to issue
/// concurrently as long as the collection handle is.
pub struct ClientEncryption {
    kms: KmsClient,
    // Declared before `store`: cached key material is dropped (and
    // zeroized) before the collection reference is released.
    cache: DekCache,
    store: KeyVaultStore,
}

impl ClientEncryption {
    pub fn new(options: ClientEncryptionOptions) -> Self {
        Self {
            kms: KmsClient::new(options.kms_providers),
            cache: DekCache::new(),
            store: KeyVaultStore::new(options.key_vault),
        }
    }

    /// Creates a data key: generates fresh 96-byte key material, wraps it
    /// under the provider's master key, and persists the key document.
    /// Returns the new key's id.
    ///
    /// Argument problems are rejected before any network or database call.
    /// A failed insert leaves no partial state — the wrapped key is simply
    /// discarded.
    pub async fn create_data_key(
        &self,
        provider: KmsProvider,
        options: DataKeyOptions,
    ) -> ClientResult<Uuid> {
        let master_key = self.validate_master_key(provider, options.master_key)?;
        validate_alt_names(&options.key_alt_names)?;

        let dek = DataKey::generate()?;
        let wrapped = self.kms.wrap(&master_key, &dek).await?;

        let document = DataKeyDocument::new(master_key, wrapped, options.key_alt_names);
        let id = self.store.insert(&document).await?;

        self.cache.insert(id, dek).await;
        debug!("created data key {id} under {provider} provider");
        Ok(id)
    }

    /// Encrypts an opaque serialized value with the selected data key.
    /// Returns the self-describing envelope.
    pub async fn encrypt(&self, value: &[u8], options: EncryptOptions) -> ClientResult<Vec<u8>> {
        let document = match (&options.key_id, &options.key_alt_name) {
            (Some(id), None) => self
                .store
                .find_by_id(*id)
                .await?
                .ok_or_else(|| ClientEncryptionError::KeyNotFound(format!("no data key with id {id}")))?,
            (None, Some(name)) => self.store.find_by_alt_name(name).await?.ok_or_else(|| {
                ClientEncryptionError::KeyNotFound(format!("no data key with alt name {name}"))
            })?,
            _ => {
                return Err(ClientEncryptionError::InvalidArgument(
                    "exactly one of key_id and key_alt_name must be set".to_string(),
                ));
            }
        };

        if !document.is_active() {
            return Err(ClientEncryptionError::InvalidArgument(format!(
                "data key {} is disabled",
                document.id
            )));
        }

        let dek = self.resolve(&document).await?;
        let envelope = fieldseal_crypto::encrypt(document.id, &dek, options.algorithm, value)?;
        debug!(
            "encrypted {} bytes with key {} ({})",
            value.len(),
            document.id,
            options.algorithm
        );
        Ok(envelope)
    }

    /// Decrypts an envelope produced by [`encrypt`](Self::encrypt). The key
    /// reference and algorithm come from the envelope itself.
    pub async fn decrypt(&self, envelope: &[u8]) -> ClientResult<Vec<u8>> {
        let key_id = fieldseal_crypto::key_id(envelope)?;

        let document = self.store.find_by_id(key_id).await?.ok_or_else(|| {
            ClientEncryptionError::KeyNotFound(format!(
                "envelope references unknown data key {key_id}"
            ))
        })?;

        let dek = self.resolve(&document).await?;
        let value = fieldseal_crypto::decrypt(&dek, envelope)?;
        debug!("decrypted envelope under key {key_id}");
        Ok(value)
    }

    /// Unwraps a document's key material, consulting the cache first.
    async fn resolve(&self, document: &DataKeyDocument) -> ClientResult<DataKey> {
        if let Some(dek) = self.cache.get(&document.id).await {
            return Ok(dek);
        }

        let dek = self
            .kms
            .unwrap(&document.master_key, &document.key_material)
            .await?;
        self.cache.insert(document.id, dek.clone()).await;
        Ok(dek)
    }

    fn validate_master_key(
        &self,
        provider: KmsProvider,
        master_key: Option<MasterKey>,
    ) -> ClientResult<MasterKey> {
        if !self.kms.providers().is_configured(provider) {
            return Err(ClientEncryptionError::InvalidArgument(format!(
                "no credentials configured for KMS provider {provider}"
            )));
        }

        match (provider, master_key) {
            (KmsProvider::Local, None | Some(MasterKey::Local)) => Ok(MasterKey::Local),
            (_, Some(master_key)) if master_key.provider() == provider => Ok(master_key),
            (_, Some(other)) => Err(ClientEncryptionError::InvalidArgument(format!(
                "master key spec is for provider {}, not {provider}",
                other.provider()
            ))),
            (_, None) => Err(ClientEncryptionError::InvalidArgument(format!(
                "provider {provider} requires a master key spec"
            ))),
        }
    }
}

impl std::fmt::Debug for ClientEncryption {
    // Deliberately opaque: no configuration or key state leaks through
    // debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEncryption").finish_non_exhaustive()
    }
}

fn validate_alt_names(names: &[String]) -> ClientResult<()> {
    for (index, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(ClientEncryptionError::InvalidArgument(
                "key alt names must be non-empty".to_string(),
            ));
        }
        if names[..index].contains(name) {
            return Err(ClientEncryptionError::InvalidArgument(format!(
                "duplicate key alt name {name}"
            )));
        }
    }
    Ok(())
}
