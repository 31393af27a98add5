//! The `local` provider: wrap/unwrap against a configured in-process secret.
//!
//! No network round trip — the master "key" is the 96-byte secret from the
//! credential set, used directly as the key-encryption key.

use crate::error::KmsResult;
use fieldseal_crypto::DataKey;

pub(crate) fn wrap(master_secret: &DataKey, dek: &DataKey) -> KmsResult<Vec<u8>> {
    Ok(fieldseal_crypto::wrap_key(master_secret, dek.as_bytes())?)
}

pub(crate) fn unwrap(master_secret: &DataKey, wrapped: &[u8]) -> KmsResult<DataKey> {
    let material = fieldseal_crypto::unwrap_key(master_secret, wrapped)?;
    Ok(DataKey::try_from_slice(&material)?)
}
