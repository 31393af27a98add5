//! Per-provider credential configuration.
//!
//! Supplied once at manager construction, immutable afterwards, never
//! persisted. Secrets get redacted `Debug` output and are dropped with the
//! owning set.

use crate::error::{KmsError, KmsResult};
use crate::provider::KmsProvider;
use fieldseal_crypto::DataKey;

/// Static AWS credentials for KMS calls.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Azure client-credentials grant material.
#[derive(Clone)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Override for the identity platform (token) endpoint, used in tests.
    pub identity_platform_endpoint: Option<String>,
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// GCP bearer token. Token acquisition and refresh are the caller's
/// responsibility; the adapter stays stateless.
#[derive(Clone)]
pub struct GcpCredentials {
    pub access_token: String,
}

impl std::fmt::Debug for GcpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpCredentials")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// KMIP server defaults.
#[derive(Clone, Debug)]
pub struct KmipCredentials {
    /// `host:port` of the KMIP server; port defaults to 5696 when absent.
    pub endpoint: String,
}

/// The full provider credential set held by a manager.
#[derive(Clone, Debug, Default)]
pub struct KmsProviders {
    local: Option<DataKey>,
    aws: Option<AwsCredentials>,
    azure: Option<AzureCredentials>,
    gcp: Option<GcpCredentials>,
    kmip: Option<KmipCredentials>,
}

impl KmsProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the `local` provider with its 96-byte master secret.
    pub fn with_local(mut self, key: DataKey) -> Self {
        self.local = Some(key);
        self
    }

    pub fn with_aws(mut self, credentials: AwsCredentials) -> Self {
        self.aws = Some(credentials);
        self
    }

    pub fn with_azure(mut self, credentials: AzureCredentials) -> Self {
        self.azure = Some(credentials);
        self
    }

    pub fn with_gcp(mut self, credentials: GcpCredentials) -> Self {
        self.gcp = Some(credentials);
        self
    }

    pub fn with_kmip(mut self, credentials: KmipCredentials) -> Self {
        self.kmip = Some(credentials);
        self
    }

    /// Whether credentials exist for the given provider.
    pub fn is_configured(&self, provider: KmsProvider) -> bool {
        match provider {
            KmsProvider::Local => self.local.is_some(),
            KmsProvider::Aws => self.aws.is_some(),
            KmsProvider::Azure => self.azure.is_some(),
            KmsProvider::Gcp => self.gcp.is_some(),
            KmsProvider::Kmip => self.kmip.is_some(),
        }
    }

    fn missing(provider: KmsProvider) -> KmsError {
        KmsError::Config(format!("no credentials configured for provider {provider}"))
    }

    pub(crate) fn local(&self) -> KmsResult<&DataKey> {
        self.local.as_ref().ok_or_else(|| Self::missing(KmsProvider::Local))
    }

    pub(crate) fn aws(&self) -> KmsResult<&AwsCredentials> {
        self.aws.as_ref().ok_or_else(|| Self::missing(KmsProvider::Aws))
    }

    pub(crate) fn azure(&self) -> KmsResult<&AzureCredentials> {
        self.azure.as_ref().ok_or_else(|| Self::missing(KmsProvider::Azure))
    }

    pub(crate) fn gcp(&self) -> KmsResult<&GcpCredentials> {
        self.gcp.as_ref().ok_or_else(|| Self::missing(KmsProvider::Gcp))
    }

    pub(crate) fn kmip(&self) -> KmsResult<&KmipCredentials> {
        self.kmip.as_ref().ok_or_else(|| Self::missing(KmsProvider::Kmip))
    }
}
