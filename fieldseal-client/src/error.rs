//! Manager-level error types.

use fieldseal_crypto::CryptoError;
use fieldseal_keyvault::KeyVaultError;
use fieldseal_kms::KmsError;
use thiserror::Error;

/// Result type for client encryption operations.
pub type ClientResult<T> = Result<T, ClientEncryptionError>;

/// Errors surfaced by [`ClientEncryption`](crate::ClientEncryption).
///
/// Every failure aborts the operation with no partial side effect. The
/// variants stay programmatically distinct: argument problems are caught
/// before any I/O, missing keys are not I/O failures, and KMS errors keep
/// their transient/fatal split (see [`KmsError::is_transient`]).
#[derive(Debug, Error)]
pub enum ClientEncryptionError {
    /// Malformed or missing options, detected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Key resolution returned nothing.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Master-key wrap/unwrap failed.
    #[error(transparent)]
    Kms(#[from] KmsError),

    /// Key vault read or write failed.
    #[error(transparent)]
    KeyVault(#[from] KeyVaultError),

    /// Envelope encryption or decryption failed. Decryption failures are
    /// all-or-nothing; no plaintext accompanies this error.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
