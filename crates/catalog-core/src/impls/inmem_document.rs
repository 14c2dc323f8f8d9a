//! InMemoryDocument - 開発・テスト用の永続化

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::Record;
use crate::error::CatalogError;
use crate::ports::DocumentStore;

/// In-memory [`DocumentStore`] with a switch for simulating a broken medium.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    records: Mutex<Vec<Record>>,
    fail_loads: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// While set, every `load` fails with [`CatalogError::Storage`].
    pub fn fail_loads(&self, on: bool) {
        self.fail_loads.store(on, Ordering::SeqCst);
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocument {
    async fn ensure_exists(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Record>, CatalogError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(CatalogError::Storage("injected load failure".to_string()));
        }
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &[Record]) -> Result<(), CatalogError> {
        *self.records.lock().await = records.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
