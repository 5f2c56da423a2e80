//! Object storage abstraction for uploaded bundles.
//!
//! Bundles live in an [`ObjectStore`] keyed by
//! `apps/{user_id}/{app_id}/versions/{file_name}`. The filesystem backend is
//! the default for self-hosted deployments; the in-memory backend exists for
//! tests.

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use traits::ObjectStore;

/// Builds the object-storage key prefix for an app's versions.
pub fn versions_prefix(user_id: uuid::Uuid, app_id: &str) -> String {
    format!("apps/{}/{}/versions", user_id, app_id)
}
