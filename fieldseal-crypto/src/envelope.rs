//! The ciphertext envelope: the self-describing unit an encrypt operation
//! produces and a decrypt operation consumes.
//!
//! Wire layout:
//!
//! ```text
//! tag(1) || key_id(16) || iv(16) || AES-256-CBC ciphertext || hmac(32)
//! ```
//!
//! The HMAC covers everything before it (encrypt-then-MAC), so any tampering
//! with the algorithm tag, key reference, IV, or ciphertext is rejected
//! before a single block is decrypted. Decrypt needs nothing beyond the
//! envelope and access to the referenced key.

use crate::cipher::{self, IV_LEN, TAG_LEN};
use crate::error::{CryptoError, CryptoResult};
use crate::key::DataKey;
use uuid::Uuid;

/// Stable identifier for the deterministic algorithm. Embedded ciphertexts
/// depend on this string never changing.
pub const ALGORITHM_DETERMINISTIC: &str = "AEAD_AES_256_CBC_HMAC_SHA_512-Deterministic";

/// Stable identifier for the randomized algorithm.
pub const ALGORITHM_RANDOM: &str = "AEAD_AES_256_CBC_HMAC_SHA_512-Random";

/// Envelope header: algorithm tag byte plus the 128-bit key id.
const HEADER_LEN: usize = 1 + 16;

/// Smallest well-formed envelope: header, IV, one cipher block, tag.
const MIN_ENVELOPE_LEN: usize = HEADER_LEN + IV_LEN + 16 + TAG_LEN;

/// Field encryption algorithm.
///
/// Deterministic derives the IV from the key and plaintext, so equal values
/// under the same key produce byte-identical envelopes (supports equality
/// lookups, leaks repetition). Random draws a fresh IV per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Deterministic,
    Random,
}

impl Algorithm {
    /// The tag byte embedded as the first byte of every envelope.
    pub fn tag_byte(self) -> u8 {
        match self {
            Algorithm::Deterministic => 1,
            Algorithm::Random => 2,
        }
    }

    pub fn from_tag_byte(tag: u8) -> CryptoResult<Self> {
        match tag {
            1 => Ok(Algorithm::Deterministic),
            2 => Ok(Algorithm::Random),
            other => Err(CryptoError::Decryption(format!(
                "unknown algorithm tag: {other:#04x}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Deterministic => ALGORITHM_DETERMINISTIC,
            Algorithm::Random => ALGORITHM_RANDOM,
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<Self> {
        match s {
            ALGORITHM_DETERMINISTIC => Ok(Algorithm::Deterministic),
            ALGORITHM_RANDOM => Ok(Algorithm::Random),
            other => Err(CryptoError::Encryption(format!(
                "unknown algorithm: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encrypts an opaque byte string into an envelope bound to `key_id`.
///
/// The plaintext is whatever serialized form the caller's codec produced;
/// this layer never interprets it.
pub fn encrypt(
    key_id: Uuid,
    key: &DataKey,
    algorithm: Algorithm,
    plaintext: &[u8],
) -> CryptoResult<Vec<u8>> {
    let mut header = [0u8; HEADER_LEN];
    header[0] = algorithm.tag_byte();
    header[1..].copy_from_slice(key_id.as_bytes());

    let iv = match algorithm {
        Algorithm::Deterministic => cipher::derived_iv(key.iv_key(), &[&header, plaintext])?,
        Algorithm::Random => cipher::random_iv()?,
    };

    let ciphertext = cipher::encrypt_cbc(key.enc_key(), &iv, plaintext)?;
    let tag = cipher::compute_tag(key.mac_key(), &[&header, &iv, &ciphertext])?;

    let mut envelope = Vec::with_capacity(HEADER_LEN + IV_LEN + ciphertext.len() + TAG_LEN);
    envelope.extend_from_slice(&header);
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);
    envelope.extend_from_slice(&tag);
    Ok(envelope)
}

/// Decrypts an envelope. The authentication tag is verified in constant time
/// before any block is decrypted; failure of any step returns
/// [`CryptoError::Decryption`] with no partial output.
pub fn decrypt(key: &DataKey, envelope: &[u8]) -> CryptoResult<Vec<u8>> {
    if envelope.len() < MIN_ENVELOPE_LEN {
        return Err(CryptoError::Decryption(format!(
            "envelope too short: {} bytes",
            envelope.len()
        )));
    }

    let (header, rest) = envelope.split_at(HEADER_LEN);
    Algorithm::from_tag_byte(header[0])?;
    let (iv_bytes, rest) = rest.split_at(IV_LEN);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

    if ciphertext.len() % 16 != 0 {
        return Err(CryptoError::Decryption(
            "ciphertext is not block-aligned".to_string(),
        ));
    }

    cipher::verify_tag(key.mac_key(), &[header, iv_bytes, ciphertext], tag)?;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(iv_bytes);
    cipher::decrypt_cbc(key.enc_key(), &iv, ciphertext)
}

/// Reads the key id an envelope references without decrypting it.
pub fn key_id(envelope: &[u8]) -> CryptoResult<Uuid> {
    if envelope.len() < MIN_ENVELOPE_LEN {
        return Err(CryptoError::Decryption(format!(
            "envelope too short: {} bytes",
            envelope.len()
        )));
    }
    Algorithm::from_tag_byte(envelope[0])?;
    let mut id = [0u8; 16];
    id.copy_from_slice(&envelope[1..HEADER_LEN]);
    Ok(Uuid::from_bytes(id))
}

/// Reads the algorithm tag of an envelope.
pub fn algorithm(envelope: &[u8]) -> CryptoResult<Algorithm> {
    let first = envelope
        .first()
        .ok_or_else(|| CryptoError::Decryption("empty envelope".to_string()))?;
    Algorithm::from_tag_byte(*first)
}
