//! Key vault error types.

use thiserror::Error;

/// Result type for key vault operations.
pub type KeyVaultResult<T> = Result<T, KeyVaultError>;

/// Errors from the key vault persistence layer.
///
/// Lookups that find nothing are `Ok(None)`, not errors — turning "absent"
/// into a user-facing failure is the orchestration layer's job.
#[derive(Debug, Error)]
pub enum KeyVaultError {
    #[error("key vault write failed: {0}")]
    Write(String),

    #[error("key vault read failed: {0}")]
    Read(String),

    /// Unique-index conflict on `_id` or a key alt name.
    #[error("duplicate key document: {0}")]
    Duplicate(String),

    /// A stored document failed to decode.
    #[error("malformed key document: {0}")]
    Malformed(String),
}
