//! Master-key provider adapters for FieldSeal.
//!
//! A data key is never persisted raw: it is wrapped under a master key held
//! by one of the supported services — a local in-process secret, AWS KMS,
//! Azure Key Vault, GCP Cloud KMS, or a KMIP server. This crate provides a
//! uniform wrap/unwrap interface over all of them.
//!
//! Adapters are stateless with respect to keys: nothing unwrapped is cached
//! here, and every remote call carries its own authentication. Failures
//! distinguish transient network trouble from fatal credential problems so
//! callers can choose a retry policy; this layer never retries on its own.

mod aws;
mod azure;
mod client;
mod credentials;
mod error;
mod gcp;
mod kmip;
mod local;
mod provider;
mod ttlv;

pub use client::KmsClient;
pub use credentials::{
    AwsCredentials, AzureCredentials, GcpCredentials, KmipCredentials, KmsProviders,
};
pub use error::{KmsError, KmsResult};
pub use provider::{KmsProvider, MasterKey};
