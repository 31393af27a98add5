//! Adversarial tests for the field-encryption envelope.
//!
//! Validates that:
//! - Both algorithms round-trip arbitrary byte strings
//! - Deterministic encryption is byte-stable and plaintext-sensitive
//! - Randomized encryption is unlinkable across calls
//! - Every single-bit flip anywhere in an envelope is rejected
//! - Truncated, empty, and hand-built envelopes are rejected

use fieldseal_crypto::{Algorithm, CryptoError, DataKey, KEY_LEN, decrypt, encrypt, key_id};
use uuid::Uuid;

fn fixed_key() -> DataKey {
    DataKey::from_bytes(std::array::from_fn(|i| (i * 13 % 251) as u8))
}

#[test]
fn deterministic_roundtrip() {
    let key = fixed_key();
    let id = Uuid::new_v4();
    let envelope = encrypt(id, &key, Algorithm::Deterministic, b"hello").unwrap();
    assert_eq!(decrypt(&key, &envelope).unwrap(), b"hello");
}

#[test]
fn random_roundtrip() {
    let key = fixed_key();
    let id = Uuid::new_v4();
    let envelope = encrypt(id, &key, Algorithm::Random, b"hello").unwrap();
    assert_eq!(decrypt(&key, &envelope).unwrap(), b"hello");
}

#[test]
fn empty_plaintext_roundtrips() {
    let key = fixed_key();
    for alg in [Algorithm::Deterministic, Algorithm::Random] {
        let envelope = encrypt(Uuid::new_v4(), &key, alg, b"").unwrap();
        assert!(decrypt(&key, &envelope).unwrap().is_empty());
    }
}

#[test]
fn large_plaintext_roundtrips() {
    let key = fixed_key();
    let value = vec![0xC3u8; 64 * 1024];
    let envelope = encrypt(Uuid::new_v4(), &key, Algorithm::Random, &value).unwrap();
    assert_eq!(decrypt(&key, &envelope).unwrap(), value);
}

#[test]
fn deterministic_is_byte_stable() {
    let key = fixed_key();
    let id = Uuid::new_v4();
    let a = encrypt(id, &key, Algorithm::Deterministic, b"repeated value").unwrap();
    let b = encrypt(id, &key, Algorithm::Deterministic, b"repeated value").unwrap();
    assert_eq!(a, b, "same value, key, and id must produce identical envelopes");
}

#[test]
fn deterministic_differs_for_different_plaintexts() {
    let key = fixed_key();
    let id = Uuid::new_v4();
    let a = encrypt(id, &key, Algorithm::Deterministic, b"value one").unwrap();
    let b = encrypt(id, &key, Algorithm::Deterministic, b"value two").unwrap();
    assert_ne!(a, b);
}

#[test]
fn deterministic_differs_across_keys() {
    let id = Uuid::new_v4();
    let key_a = DataKey::from_bytes([0x01; KEY_LEN]);
    let key_b = DataKey::from_bytes([0x02; KEY_LEN]);
    let a = encrypt(id, &key_a, Algorithm::Deterministic, b"value").unwrap();
    let b = encrypt(id, &key_b, Algorithm::Deterministic, b"value").unwrap();
    assert_ne!(a, b);
}

#[test]
fn random_is_unlinkable_over_many_trials() {
    let key = fixed_key();
    let id = Uuid::new_v4();

    let mut seen = std::collections::HashSet::new();
    for _ in 0..1000 {
        let envelope = encrypt(id, &key, Algorithm::Random, b"same value").unwrap();
        assert!(
            seen.insert(envelope),
            "randomized encryption repeated a ciphertext"
        );
    }
}

#[test]
fn every_single_bit_flip_is_detected() {
    let key = fixed_key();
    let envelope = encrypt(Uuid::new_v4(), &key, Algorithm::Deterministic, b"bit flip target").unwrap();

    for byte in 0..envelope.len() {
        for bit in 0..8 {
            let mut tampered = envelope.clone();
            tampered[byte] ^= 1 << bit;
            let err = decrypt(&key, &tampered).unwrap_err();
            assert!(
                matches!(err, CryptoError::Decryption(_)),
                "flip at byte {byte} bit {bit} must fail decryption"
            );
        }
    }
}

#[test]
fn wrong_key_fails() {
    let envelope = encrypt(
        Uuid::new_v4(),
        &DataKey::from_bytes([0x01; KEY_LEN]),
        Algorithm::Random,
        b"secret",
    )
    .unwrap();

    let err = decrypt(&DataKey::from_bytes([0x02; KEY_LEN]), &envelope).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
}

#[test]
fn truncated_envelope_fails() {
    let key = fixed_key();
    let envelope = encrypt(Uuid::new_v4(), &key, Algorithm::Random, b"secret").unwrap();

    for len in 0..envelope.len() {
        let err = decrypt(&key, &envelope[..len]).unwrap_err();
        assert!(matches!(err, CryptoError::Decryption(_)));
    }
}

#[test]
fn hand_built_envelope_fails() {
    let key = fixed_key();
    let mut fake = vec![1u8]; // deterministic tag
    fake.extend_from_slice(Uuid::new_v4().as_bytes());
    fake.extend_from_slice(&[0u8; 16]); // iv
    fake.extend_from_slice(&[0xDEu8; 16]); // one garbage block
    fake.extend_from_slice(&[0u8; 32]); // zero tag
    assert!(decrypt(&key, &fake).is_err());
}

#[test]
fn unknown_algorithm_tag_rejected() {
    let key = fixed_key();
    let mut envelope = encrypt(Uuid::new_v4(), &key, Algorithm::Random, b"secret").unwrap();
    envelope[0] = 0x7F;
    assert!(decrypt(&key, &envelope).is_err());
    assert!(key_id(&envelope).is_err());
}

#[test]
fn key_id_extraction_matches_input() {
    let key = fixed_key();
    let id = Uuid::new_v4();
    let envelope = encrypt(id, &key, Algorithm::Random, b"secret").unwrap();
    assert_eq!(key_id(&envelope).unwrap(), id);
}
