//! End-to-end manager tests with the local provider and in-memory vault.

use async_trait::async_trait;
use fieldseal_client::{
    Algorithm, ClientEncryption, ClientEncryptionError, ClientEncryptionOptions, DataKeyOptions,
    EncryptOptions, KeyStatus, KmsProvider, KmsProviders, MasterKey, MemoryCollection,
};
use fieldseal_crypto::DataKey;
use fieldseal_keyvault::{DataKeyDocument, KeyVaultCollection, KeyVaultResult, KeyVaultStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

const LOCAL_SECRET: [u8; 96] = [0x6F; 96];

fn manager_with(collection: Arc<dyn KeyVaultCollection>) -> ClientEncryption {
    ClientEncryption::new(ClientEncryptionOptions {
        key_vault: collection,
        kms_providers: KmsProviders::new().with_local(DataKey::from_bytes(LOCAL_SECRET)),
    })
}

fn manager() -> ClientEncryption {
    manager_with(Arc::new(MemoryCollection::new()))
}

/// Collection wrapper that counts every call reaching the vault.
struct CountingCollection {
    inner: MemoryCollection,
    inserts: AtomicUsize,
    finds: AtomicUsize,
}

impl CountingCollection {
    fn new() -> Self {
        Self {
            inner: MemoryCollection::new(),
            inserts: AtomicUsize::new(0),
            finds: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KeyVaultCollection for CountingCollection {
    async fn insert_one(&self, document: serde_json::Value) -> KeyVaultResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_one(document).await
    }

    async fn find_one(
        &self,
        filter: serde_json::Value,
    ) -> KeyVaultResult<Option<serde_json::Value>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_one(filter).await
    }
}

// ── create_data_key ──

#[tokio::test]
async fn create_data_key_returns_16_byte_id_and_persists_wrapped_material() {
    let collection = Arc::new(MemoryCollection::new());
    let manager = manager_with(collection.clone());

    let id = manager
        .create_data_key(KmsProvider::Local, DataKeyOptions::default())
        .await
        .unwrap();
    assert_eq!(id.as_bytes().len(), 16);

    let store = KeyVaultStore::new(collection);
    let doc = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(doc.status, KeyStatus::Active);
    assert_eq!(doc.master_key, MasterKey::Local);
    assert_eq!(doc.creation_date, doc.update_date);
    // Wrapped form: IV + 96-byte key padded under CBC + tag, never 96 raw bytes.
    assert_ne!(doc.key_material.len(), 96);
}

#[tokio::test]
async fn create_data_key_registers_alt_names() {
    let collection = Arc::new(MemoryCollection::new());
    let manager = manager_with(collection.clone());

    let id = manager
        .create_data_key(
            KmsProvider::Local,
            DataKeyOptions::default().key_alt_names(["payroll".to_string()]),
        )
        .await
        .unwrap();

    let store = KeyVaultStore::new(collection);
    assert_eq!(store.find_by_alt_name("payroll").await.unwrap().unwrap().id, id);
}

#[tokio::test]
async fn unconfigured_provider_fails_before_any_vault_call() {
    let collection = Arc::new(CountingCollection::new());
    let manager = manager_with(collection.clone());

    let err = manager
        .create_data_key(
            KmsProvider::Aws,
            DataKeyOptions::with_master_key(MasterKey::Aws {
                region: "us-east-1".into(),
                key: "arn:aws:kms:us-east-1:1:key/a".into(),
                endpoint: None,
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientEncryptionError::InvalidArgument(_)));
    assert_eq!(collection.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(collection.finds.load(Ordering::SeqCst), 0);
}

#[test]
fn unrecognized_provider_name_fails_at_parse_time() {
    // Provider names resolve to the typed enum before a manager is ever
    // involved, so a bad name cannot reach KMS or the vault.
    assert!("vault9000".parse::<KmsProvider>().is_err());
    assert_eq!("local".parse::<KmsProvider>().unwrap(), KmsProvider::Local);
}

#[tokio::test]
async fn missing_master_key_spec_is_an_argument_error() {
    let secret = DataKey::from_bytes(LOCAL_SECRET);
    let manager = ClientEncryption::new(ClientEncryptionOptions {
        key_vault: Arc::new(MemoryCollection::new()),
        kms_providers: KmsProviders::new()
            .with_local(secret)
            .with_gcp(fieldseal_client::GcpCredentials {
                access_token: "tok".into(),
            }),
    });

    let err = manager
        .create_data_key(KmsProvider::Gcp, DataKeyOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientEncryptionError::InvalidArgument(_)));
}

#[tokio::test]
async fn mismatched_master_key_spec_is_an_argument_error() {
    let manager = manager();

    let err = manager
        .create_data_key(
            KmsProvider::Local,
            DataKeyOptions::with_master_key(MasterKey::Aws {
                region: "us-east-1".into(),
                key: "arn".into(),
                endpoint: None,
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientEncryptionError::InvalidArgument(_)));
}

#[tokio::test]
async fn duplicate_alt_name_write_fails_without_partial_state() {
    let collection = Arc::new(CountingCollection::new());
    let manager = manager_with(collection.clone());

    manager
        .create_data_key(
            KmsProvider::Local,
            DataKeyOptions::default().key_alt_names(["payroll".to_string()]),
        )
        .await
        .unwrap();

    let err = manager
        .create_data_key(
            KmsProvider::Local,
            DataKeyOptions::default().key_alt_names(["payroll".to_string()]),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientEncryptionError::KeyVault(fieldseal_keyvault::KeyVaultError::Duplicate(_))
    ));

    // Only the first document landed.
    assert_eq!(collection.inner.len().await, 1);
}

// ── encrypt / decrypt ──

#[tokio::test]
async fn hello_roundtrip_with_deterministic_algorithm() {
    let manager = manager();
    let id = manager
        .create_data_key(KmsProvider::Local, DataKeyOptions::default())
        .await
        .unwrap();

    let envelope = manager
        .encrypt(b"hello", EncryptOptions::with_key_id(Algorithm::Deterministic, id))
        .await
        .unwrap();

    assert_eq!(envelope[0], Algorithm::Deterministic.tag_byte());
    assert_eq!(&envelope[1..17], id.as_bytes());
    assert_eq!(manager.decrypt(&envelope).await.unwrap(), b"hello");
}

#[tokio::test]
async fn roundtrip_by_alt_name_with_random_algorithm() {
    let manager = manager();
    manager
        .create_data_key(
            KmsProvider::Local,
            DataKeyOptions::default().key_alt_names(["pii".to_string()]),
        )
        .await
        .unwrap();

    let envelope = manager
        .encrypt(
            b"alice@example.com",
            EncryptOptions::with_key_alt_name(Algorithm::Random, "pii"),
        )
        .await
        .unwrap();

    assert_eq!(envelope[0], Algorithm::Random.tag_byte());
    assert_eq!(manager.decrypt(&envelope).await.unwrap(), b"alice@example.com");
}

#[tokio::test]
async fn decrypt_works_without_warm_cache() {
    // Separate manager instances share only the vault collection, so the
    // second one must unwrap via KMS rather than its (empty) cache.
    let collection = Arc::new(MemoryCollection::new());
    let writer = manager_with(collection.clone());
    let reader = manager_with(collection);

    let id = writer
        .create_data_key(KmsProvider::Local, DataKeyOptions::default())
        .await
        .unwrap();
    let envelope = writer
        .encrypt(b"shared", EncryptOptions::with_key_id(Algorithm::Random, id))
        .await
        .unwrap();

    assert_eq!(reader.decrypt(&envelope).await.unwrap(), b"shared");
}

#[tokio::test]
async fn both_key_selectors_rejected() {
    let manager = manager();
    let options = EncryptOptions {
        algorithm: Algorithm::Deterministic,
        key_id: Some(Uuid::new_v4()),
        key_alt_name: Some("payroll".into()),
    };

    let err = manager.encrypt(b"v", options).await.unwrap_err();
    assert!(matches!(err, ClientEncryptionError::InvalidArgument(_)));
}

#[tokio::test]
async fn neither_key_selector_rejected() {
    let manager = manager();
    let options = EncryptOptions {
        algorithm: Algorithm::Deterministic,
        key_id: None,
        key_alt_name: None,
    };

    let err = manager.encrypt(b"v", options).await.unwrap_err();
    assert!(matches!(err, ClientEncryptionError::InvalidArgument(_)));
}

#[tokio::test]
async fn encrypt_with_unknown_key_id_is_key_not_found() {
    let manager = manager();
    let err = manager
        .encrypt(
            b"v",
            EncryptOptions::with_key_id(Algorithm::Deterministic, Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientEncryptionError::KeyNotFound(_)));
}

#[tokio::test]
async fn encrypt_with_unknown_alt_name_is_key_not_found() {
    let manager = manager();
    let err = manager
        .encrypt(
            b"v",
            EncryptOptions::with_key_alt_name(Algorithm::Deterministic, "ghost"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientEncryptionError::KeyNotFound(_)));
}

#[tokio::test]
async fn decrypt_of_envelope_for_absent_key_is_key_not_found() {
    let manager = manager();

    // A valid envelope whose key id is not in the vault.
    let stray_key = DataKey::from_bytes([0x13; 96]);
    let envelope = fieldseal_crypto::encrypt(
        Uuid::new_v4(),
        &stray_key,
        Algorithm::Random,
        b"orphaned",
    )
    .unwrap();

    let err = manager.decrypt(&envelope).await.unwrap_err();
    assert!(matches!(err, ClientEncryptionError::KeyNotFound(_)));
}

#[tokio::test]
async fn tampered_envelope_fails_decryption() {
    let manager = manager();
    let id = manager
        .create_data_key(KmsProvider::Local, DataKeyOptions::default())
        .await
        .unwrap();

    let mut envelope = manager
        .encrypt(b"integrity", EncryptOptions::with_key_id(Algorithm::Random, id))
        .await
        .unwrap();
    let last = envelope.len() - 1;
    envelope[last] ^= 0x01;

    let err = manager.decrypt(&envelope).await.unwrap_err();
    assert!(matches!(err, ClientEncryptionError::Crypto(_)));
}

#[tokio::test]
async fn deterministic_envelopes_repeat_and_random_ones_do_not() {
    let manager = manager();
    let id = manager
        .create_data_key(KmsProvider::Local, DataKeyOptions::default())
        .await
        .unwrap();

    let det_a = manager
        .encrypt(b"v", EncryptOptions::with_key_id(Algorithm::Deterministic, id))
        .await
        .unwrap();
    let det_b = manager
        .encrypt(b"v", EncryptOptions::with_key_id(Algorithm::Deterministic, id))
        .await
        .unwrap();
    assert_eq!(det_a, det_b);

    let rnd_a = manager
        .encrypt(b"v", EncryptOptions::with_key_id(Algorithm::Random, id))
        .await
        .unwrap();
    let rnd_b = manager
        .encrypt(b"v", EncryptOptions::with_key_id(Algorithm::Random, id))
        .await
        .unwrap();
    assert_ne!(rnd_a, rnd_b);
}

// ── key status ──

#[tokio::test]
async fn disabled_key_is_refused_for_encrypt_but_still_decrypts() {
    let collection = Arc::new(MemoryCollection::new());
    let manager = manager_with(collection.clone());

    // Hand-build a disabled key document around locally wrapped material.
    let secret = DataKey::from_bytes(LOCAL_SECRET);
    let dek = DataKey::from_bytes([0x21; 96]);
    let wrapped = fieldseal_crypto::wrap_key(&secret, dek.as_bytes()).unwrap();
    let mut document = DataKeyDocument::new(MasterKey::Local, wrapped, vec!["retired".into()]);
    document.status = KeyStatus::Disabled;
    KeyVaultStore::new(collection).insert(&document).await.unwrap();

    let err = manager
        .encrypt(
            b"v",
            EncryptOptions::with_key_alt_name(Algorithm::Deterministic, "retired"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientEncryptionError::InvalidArgument(_)));

    // Existing ciphertexts under the disabled key must remain readable.
    let envelope =
        fieldseal_crypto::encrypt(document.id, &dek, Algorithm::Random, b"old data").unwrap();
    assert_eq!(manager.decrypt(&envelope).await.unwrap(), b"old data");
}

// ── concurrency ──

#[tokio::test]
async fn concurrent_operations_on_one_manager() {
    let manager = Arc::new(manager());
    let id = manager
        .create_data_key(KmsProvider::Local, DataKeyOptions::default())
        .await
        .unwrap();

    let tasks: Vec<_> = (0..16u8)
        .map(|i| {
            let manager = manager.clone();
            tokio::spawn(async move {
                let value = vec![i; 32];
                let envelope = manager
                    .encrypt(&value, EncryptOptions::with_key_id(Algorithm::Random, id))
                    .await
                    .unwrap();
                assert_eq!(manager.decrypt(&envelope).await.unwrap(), value);
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
}
