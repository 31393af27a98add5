//! Key vault persistence for FieldSeal.
//!
//! The key vault is a database collection of data key documents. The
//! collection handle itself is owned by the application (or the enclosing
//! driver) and reaches this crate as a shared [`KeyVaultCollection`] trait
//! object; everything here is plumbing over it — typed documents in, typed
//! documents out, uniqueness conflicts surfaced as errors, absent lookups
//! as `None`.

mod collection;
mod document;
mod error;
mod memory;
mod store;

pub use collection::KeyVaultCollection;
pub use document::{DataKeyDocument, KeyStatus};
pub use error::{KeyVaultError, KeyVaultResult};
pub use memory::MemoryCollection;
pub use store::KeyVaultStore;
