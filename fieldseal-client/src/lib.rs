//! Client-side field-level encryption for document database clients.
//!
//! Lets an application generate and manage data encryption keys and
//! encrypt/decrypt individual field values before they leave (or after they
//! arrive at) the process. The server side of the database never sees
//! plaintext or the keys protecting it:
//!
//! - data keys are generated locally and persisted only in wrapped form,
//!   protected by a master key held by a KMS provider (`fieldseal-kms`);
//! - key documents live in a key vault collection reached through an
//!   application-supplied handle (`fieldseal-keyvault`);
//! - values are sealed into self-describing envelopes (`fieldseal-crypto`).
//!
//! The entry point is [`ClientEncryption`] with its three operations:
//! [`create_data_key`](ClientEncryption::create_data_key),
//! [`encrypt`](ClientEncryption::encrypt), and
//! [`decrypt`](ClientEncryption::decrypt).
//!
//! Values are opaque byte strings here; converting typed values to and from
//! bytes is the caller's codec's responsibility.

mod cache;
mod client;
mod error;
mod options;

pub use client::{ClientEncryption, ClientEncryptionOptions};
pub use error::{ClientEncryptionError, ClientResult};
pub use options::{DataKeyOptions, EncryptOptions};

// Re-exported collaborator types so callers can depend on this crate alone.
pub use fieldseal_crypto::{ALGORITHM_DETERMINISTIC, ALGORITHM_RANDOM, Algorithm};
pub use fieldseal_keyvault::{
    DataKeyDocument, KeyStatus, KeyVaultCollection, KeyVaultError, MemoryCollection,
};
pub use fieldseal_kms::{
    AwsCredentials, AzureCredentials, GcpCredentials, KmipCredentials, KmsError, KmsProvider,
    KmsProviders, MasterKey,
};
