//! Provider dispatch for wrap/unwrap.

use crate::credentials::KmsProviders;
use crate::error::{KmsError, KmsResult};
use crate::provider::MasterKey;
use crate::{aws, azure, gcp, kmip, local};
use fieldseal_crypto::DataKey;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Uniform interface to the configured master-key services.
///
/// Dispatches on the master-key spec's provider tag. Holds the HTTP client
/// and the immutable credential set and nothing else — no key material is
/// retained between calls.
pub struct KmsClient {
    http: Client,
    providers: KmsProviders,
}

impl KmsClient {
    pub fn new(providers: KmsProviders) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { http, providers }
    }

    pub fn providers(&self) -> &KmsProviders {
        &self.providers
    }

    /// Wraps a freshly generated data key under the given master key.
    pub async fn wrap(&self, master_key: &MasterKey, dek: &DataKey) -> KmsResult<Vec<u8>> {
        debug!("wrapping data key via {} provider", master_key.provider());
        match master_key {
            MasterKey::Local => local::wrap(self.providers.local()?, dek),
            MasterKey::Aws { region, key, endpoint } => {
                aws::wrap(self.providers.aws()?, region, key, endpoint.as_deref(), dek).await
            }
            MasterKey::Azure { key_vault_endpoint, key_name, key_version } => {
                azure::wrap(
                    &self.http,
                    self.providers.azure()?,
                    key_vault_endpoint,
                    key_name,
                    key_version.as_deref(),
                    dek,
                )
                .await
            }
            MasterKey::Gcp { project_id, location, key_ring, key_name, endpoint } => {
                gcp::wrap(
                    &self.http,
                    self.providers.gcp()?,
                    project_id,
                    location,
                    key_ring,
                    key_name,
                    endpoint.as_deref(),
                    dek,
                )
                .await
            }
            MasterKey::Kmip { key_id, endpoint } => {
                kmip::wrap(self.providers.kmip()?, key_id, endpoint.as_deref(), dek).await
            }
        }
    }

    /// Unwraps persisted key material using the master key recorded in its
    /// key document. Validates the recovered key length.
    pub async fn unwrap(&self, master_key: &MasterKey, wrapped: &[u8]) -> KmsResult<DataKey> {
        if wrapped.is_empty() {
            return Err(KmsError::Response(
                "wrapped key material is empty".to_string(),
            ));
        }
        debug!("unwrapping data key via {} provider", master_key.provider());
        match master_key {
            MasterKey::Local => local::unwrap(self.providers.local()?, wrapped),
            MasterKey::Aws { region, key, endpoint } => {
                aws::unwrap(self.providers.aws()?, region, key, endpoint.as_deref(), wrapped).await
            }
            MasterKey::Azure { key_vault_endpoint, key_name, key_version } => {
                azure::unwrap(
                    &self.http,
                    self.providers.azure()?,
                    key_vault_endpoint,
                    key_name,
                    key_version.as_deref(),
                    wrapped,
                )
                .await
            }
            MasterKey::Gcp { project_id, location, key_ring, key_name, endpoint } => {
                gcp::unwrap(
                    &self.http,
                    self.providers.gcp()?,
                    project_id,
                    location,
                    key_ring,
                    key_name,
                    endpoint.as_deref(),
                    wrapped,
                )
                .await
            }
            MasterKey::Kmip { key_id, endpoint } => {
                kmip::unwrap(self.providers.kmip()?, key_id, endpoint.as_deref(), wrapped).await
            }
        }
    }
}
