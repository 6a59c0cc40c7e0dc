//! External persistence boundary: an async key-value store holding the
//! transform record and, under a separate key, the persistence preference.
//! All operations are idempotent and best-effort from the caller's view.

pub mod json_store;
pub mod memory;

pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

use crate::transform::settings::TransformSettings;
use crate::utils::Result;
use std::future::Future;

pub trait PersistenceGateway: Send + Sync + 'static {
    /// Stores the transform record, replacing any previous one.
    fn save(&self, settings: &TransformSettings) -> impl Future<Output = Result<()>> + Send;

    /// Loads the stored record, or `None` when nothing is stored.
    fn load(&self) -> impl Future<Output = Result<Option<TransformSettings>>> + Send;

    /// Removes the stored record. Clearing an absent record succeeds.
    fn clear(&self) -> impl Future<Output = Result<()>> + Send;

    /// Stores the persistence preference under its own key.
    fn save_preference(&self, enabled: bool) -> impl Future<Output = Result<()>> + Send;

    /// Loads the persistence preference, or `None` when never set.
    fn load_preference(&self) -> impl Future<Output = Result<Option<bool>>> + Send;
}
