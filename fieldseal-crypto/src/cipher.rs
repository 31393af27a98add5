//! AES-256-CBC + HMAC-SHA-512 primitives.
//!
//! Both envelope algorithms are the same encrypt-then-MAC construction and
//! differ only in where the IV comes from: derived (deterministic) or drawn
//! from the OS CSPRNG (randomized). The HMAC-SHA-512 output is truncated to
//! 32 bytes for the authentication tag.

use crate::error::{CryptoError, CryptoResult};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use hmac::{Hmac, Mac};
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::Sha512;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha512 = Hmac<Sha512>;

/// Size of the CBC initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Size of the truncated HMAC-SHA-512 authentication tag in bytes.
pub const TAG_LEN: usize = 32;

pub(crate) fn encrypt_cbc(enc_key: &[u8], iv: &[u8; IV_LEN], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(enc_key, iv)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

pub(crate) fn decrypt_cbc(enc_key: &[u8], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256CbcDec::new_from_slices(enc_key, iv)
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption("invalid padding".to_string()))
}

/// Computes the truncated authentication tag over the given parts.
pub(crate) fn compute_tag(mac_key: &[u8], parts: &[&[u8]]) -> CryptoResult<[u8; TAG_LEN]> {
    let mut mac = HmacSha512::new_from_slice(mac_key)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let full = mac.finalize().into_bytes();
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&full[..TAG_LEN]);
    Ok(tag)
}

/// Constant-time verification of a truncated tag.
pub(crate) fn verify_tag(mac_key: &[u8], parts: &[&[u8]], tag: &[u8]) -> CryptoResult<()> {
    let mut mac = HmacSha512::new_from_slice(mac_key)
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    mac.verify_truncated_left(tag)
        .map_err(|_| CryptoError::Decryption("authentication tag mismatch".to_string()))
}

/// Derives a deterministic IV: the leading 16 bytes of an HMAC-SHA-512 over
/// the given parts, keyed by the key's IV subkey. Identical inputs always
/// yield the same IV.
pub(crate) fn derived_iv(iv_key: &[u8], parts: &[&[u8]]) -> CryptoResult<[u8; IV_LEN]> {
    let mut mac = HmacSha512::new_from_slice(iv_key)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let full = mac.finalize().into_bytes();
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&full[..IV_LEN]);
    Ok(iv)
}

pub(crate) fn random_iv() -> CryptoResult<[u8; IV_LEN]> {
    let mut iv = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(iv)
}
