//! Data encryption key material.

use crate::error::{CryptoError, CryptoResult};
use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a data encryption key in bytes.
///
/// The 96 bytes are three 32-byte subkeys: MAC key, encryption key, and
/// IV-derivation key.
pub const KEY_LEN: usize = 96;

const SUBKEY_LEN: usize = 32;

/// A raw data encryption key (DEK).
///
/// Only ever held in process memory in unwrapped form — persistence goes
/// through KMS wrapping. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_LEN]);

impl DataKey {
    /// Generates a fresh key from the OS secure random source.
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// HMAC key for envelope authentication.
    pub(crate) fn mac_key(&self) -> &[u8] {
        &self.0[..SUBKEY_LEN]
    }

    /// AES-256 key for the CBC layer.
    pub(crate) fn enc_key(&self) -> &[u8] {
        &self.0[SUBKEY_LEN..2 * SUBKEY_LEN]
    }

    /// HMAC key for deterministic IV derivation.
    pub(crate) fn iv_key(&self) -> &[u8] {
        &self.0[2 * SUBKEY_LEN..]
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataKey").field("key", &"[REDACTED]").finish()
    }
}
