//! In-memory record store.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{ImageRecord, NewImageRecord, RecordId, StoreError};
use crate::ports::{Clock, IdGenerator, RecordStore, SystemClock, UlidGenerator};

/// In-memory store state.
#[derive(Default)]
struct InMemoryState {
    /// All records (single source of truth).
    records: HashMap<RecordId, ImageRecord>,

    /// Uniqueness index on image_url.
    by_url: HashMap<String, RecordId>,

    /// Age index: first entry is the eviction candidate.
    by_age: BTreeSet<(DateTime<Utc>, RecordId)>,
}

impl InMemoryState {
    fn insert(&mut self, record: ImageRecord) {
        self.by_url.insert(record.image_url.clone(), record.id);
        self.by_age.insert((record.created_at, record.id));
        self.records.insert(record.id, record);
    }

    fn remove(&mut self, id: &RecordId) -> Option<ImageRecord> {
        let record = self.records.remove(id)?;
        self.by_url.remove(&record.image_url);
        self.by_age.remove(&(record.created_at, record.id));
        Some(record)
    }
}

/// In-memory [`RecordStore`] for tests and development.
///
/// Mirrors the SQLite store's semantics: unique `image_url`, oldest by
/// `(created_at, id)`.
pub struct InMemoryRecordStore {
    state: Mutex<InMemoryState>,
    clock: Arc<dyn Clock>,
    ids: UlidGenerator<Arc<dyn Clock>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(InMemoryState::default()),
            ids: UlidGenerator::new(Arc::clone(&clock)),
            clock,
        }
    }

    pub async fn contains_url(&self, image_url: &str) -> bool {
        self.state.lock().await.by_url.contains_key(image_url)
    }

    pub async fn get(&self, id: &RecordId) -> Option<ImageRecord> {
        self.state.lock().await.records.get(id).cloned()
    }

    /// All records, oldest first.
    pub async fn snapshot(&self) -> Vec<ImageRecord> {
        let state = self.state.lock().await;
        state
            .by_age
            .iter()
            .filter_map(|(_, id)| state.records.get(id).cloned())
            .collect()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.state.lock().await.records.len())
    }

    async fn oldest(&self) -> Result<Option<ImageRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .by_age
            .first()
            .and_then(|(_, id)| state.records.get(id).cloned()))
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.remove(id).is_some())
    }

    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, StoreError> {
        let mut state = self.state.lock().await;
        if state.by_url.contains_key(&record.image_url) {
            return Err(StoreError::DuplicateKey {
                image_url: record.image_url,
            });
        }
        let stored = record.into_record(self.ids.generate_record_id(), self.clock.now());
        state.insert(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ImageRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .by_age
            .iter()
            .rev()
            .take(limit)
            .filter_map(|(_, id)| state.records.get(id).cloned())
            .collect())
    }
}
