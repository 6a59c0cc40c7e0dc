use super::PersistenceGateway;
use crate::transform::settings::TransformSettings;
use crate::utils::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory gateway. Backs the demo binary's ephemeral mode and lets tests
/// assert exactly how often the controller reached for persistence.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<TransformSettings>>,
    preference: Mutex<Option<bool>>,
    save_calls: AtomicUsize,
    clear_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }

    pub fn stored_record(&self) -> Option<TransformSettings> {
        *self.record.lock().unwrap()
    }
}

impl PersistenceGateway for MemoryStore {
    async fn save(&self, settings: &TransformSettings) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = Some(*settings);
        Ok(())
    }

    async fn load(&self) -> Result<Option<TransformSettings>> {
        Ok(*self.record.lock().unwrap())
    }

    async fn clear(&self) -> Result<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = None;
        Ok(())
    }

    async fn save_preference(&self, enabled: bool) -> Result<()> {
        *self.preference.lock().unwrap() = Some(enabled);
        Ok(())
    }

    async fn load_preference(&self) -> Result<Option<bool>> {
        Ok(*self.preference.lock().unwrap())
    }
}
