//! Provider identifiers and master-key locators.

use crate::error::KmsError;
use serde::{Deserialize, Serialize};

/// The supported master-key services.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KmsProvider {
    Local,
    Aws,
    Azure,
    Gcp,
    Kmip,
}

impl KmsProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            KmsProvider::Local => "local",
            KmsProvider::Aws => "aws",
            KmsProvider::Azure => "azure",
            KmsProvider::Gcp => "gcp",
            KmsProvider::Kmip => "kmip",
        }
    }
}

impl std::str::FromStr for KmsProvider {
    type Err = KmsError;

    fn from_str(s: &str) -> Result<Self, KmsError> {
        match s {
            "local" => Ok(KmsProvider::Local),
            "aws" => Ok(KmsProvider::Aws),
            "azure" => Ok(KmsProvider::Azure),
            "gcp" => Ok(KmsProvider::Gcp),
            "kmip" => Ok(KmsProvider::Kmip),
            other => Err(KmsError::Config(format!(
                "unrecognized KMS provider: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for KmsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which master key wrapped a data key, and where to find it.
///
/// One variant per provider, dispatched by the stored `provider` tag. This
/// is persisted inside every key document — unwrapping later depends on it —
/// so field names are part of the stored document format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum MasterKey {
    /// The configured local secret; no locator needed.
    Local,

    #[serde(rename_all = "camelCase")]
    Aws {
        region: String,
        /// Key ARN or alias.
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Azure {
        key_vault_endpoint: String,
        key_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key_version: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Gcp {
        project_id: String,
        location: String,
        key_ring: String,
        key_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Kmip {
        /// Unique identifier of an existing 96-byte SecretData object.
        key_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },
}

impl MasterKey {
    pub fn provider(&self) -> KmsProvider {
        match self {
            MasterKey::Local => KmsProvider::Local,
            MasterKey::Aws { .. } => KmsProvider::Aws,
            MasterKey::Azure { .. } => KmsProvider::Azure,
            MasterKey::Gcp { .. } => KmsProvider::Gcp,
            MasterKey::Kmip { .. } => KmsProvider::Kmip,
        }
    }
}
