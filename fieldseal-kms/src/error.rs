//! KMS adapter error types.

use thiserror::Error;

/// Result type for KMS operations.
pub type KmsResult<T> = Result<T, KmsError>;

/// Errors from master-key wrap/unwrap operations.
///
/// The transient/fatal split is deliberate: this layer never retries, it
/// surfaces enough structure for the caller to decide. [`KmsError::Network`]
/// failures may succeed on retry; [`KmsError::Auth`] failures will not.
#[derive(Debug, Error)]
pub enum KmsError {
    /// Transient transport failure (connect, timeout, TLS).
    #[error("KMS network failure: {0}")]
    Network(String),

    /// Fatal credential or authorization failure.
    #[error("KMS authentication failure: {0}")]
    Auth(String),

    /// The provider replied, but not with anything usable.
    #[error("malformed KMS response: {0}")]
    Response(String),

    /// Provider not configured, or master-key spec does not match it.
    #[error("KMS configuration error: {0}")]
    Config(String),

    /// Local cryptographic failure while wrapping or unwrapping.
    #[error("KMS crypto failure: {0}")]
    Crypto(#[from] fieldseal_crypto::CryptoError),
}

impl KmsError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, KmsError::Network(_))
    }
}

impl From<reqwest::Error> for KmsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            KmsError::Network(err.to_string())
        } else {
            KmsError::Response(err.to_string())
        }
    }
}
