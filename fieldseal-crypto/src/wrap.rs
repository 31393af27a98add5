//! Key wrapping with a locally held master key.
//!
//! Used by KMS providers that end up holding the key-encryption key in
//! process (the `local` provider's configured secret, or a secret fetched
//! from a KMIP server). The construction is the randomized envelope cipher
//! without the envelope header: `iv(16) || ciphertext || hmac(32)`.

use crate::cipher::{self, IV_LEN, TAG_LEN};
use crate::error::{CryptoError, CryptoResult};
use crate::key::DataKey;

const MIN_WRAPPED_LEN: usize = IV_LEN + 16 + TAG_LEN;

/// Wraps (encrypts) raw key material under a 96-byte key-encryption key.
pub fn wrap_key(kek: &DataKey, key_material: &[u8]) -> CryptoResult<Vec<u8>> {
    let iv = cipher::random_iv()?;
    let ciphertext = cipher::encrypt_cbc(kek.enc_key(), &iv, key_material)?;
    let tag = cipher::compute_tag(kek.mac_key(), &[&iv, &ciphertext])?;

    let mut wrapped = Vec::with_capacity(IV_LEN + ciphertext.len() + TAG_LEN);
    wrapped.extend_from_slice(&iv);
    wrapped.extend_from_slice(&ciphertext);
    wrapped.extend_from_slice(&tag);
    Ok(wrapped)
}

/// Unwraps key material previously produced by [`wrap_key`] with the same
/// key-encryption key. Tag verification precedes decryption.
pub fn unwrap_key(kek: &DataKey, wrapped: &[u8]) -> CryptoResult<Vec<u8>> {
    if wrapped.len() < MIN_WRAPPED_LEN {
        return Err(CryptoError::Decryption(format!(
            "wrapped key too short: {} bytes",
            wrapped.len()
        )));
    }

    let (iv_bytes, rest) = wrapped.split_at(IV_LEN);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

    cipher::verify_tag(kek.mac_key(), &[iv_bytes, ciphertext], tag)?;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(iv_bytes);
    cipher::decrypt_cbc(kek.enc_key(), &iv, ciphertext)
}
