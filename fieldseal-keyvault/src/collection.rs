//! The externally owned collection handle.

use crate::error::KeyVaultResult;
use async_trait::async_trait;

/// A generic database-collection handle: document insert and find-by-filter.
///
/// Supplied by the application or the encompassing driver; the store holds
/// it behind an `Arc` and never closes it. Implementations must be safe for
/// concurrent use (wrap a non-thread-safe connection in a mutex before
/// handing it over).
///
/// Filters are JSON objects. A document matches when, for every filter
/// entry, the document field either equals the filter value or is an array
/// containing it — the two shapes the store issues are
/// `{"_id": <uuid>}` and `{"keyAltNames": <name>}`.
#[async_trait]
pub trait KeyVaultCollection: Send + Sync {
    async fn insert_one(&self, document: serde_json::Value) -> KeyVaultResult<()>;

    async fn find_one(
        &self,
        filter: serde_json::Value,
    ) -> KeyVaultResult<Option<serde_json::Value>>;
}
