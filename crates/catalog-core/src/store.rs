//! RecordStore - 一意キーつきレコード列と、その唯一の排他区間
//!
//! insert も query も同じロックを取る（reader/writer の分離はしない）。
//! ロック内で毎回 document を読み直し、変更があれば書き戻してから解放する。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::record::{NOT_FOUND, position_of};
use crate::domain::{Position, Record};
use crate::error::CatalogError;
use crate::ports::DocumentStore;

pub struct RecordStore {
    document: Arc<dyn DocumentStore>,
    /// Guards reload -> scan -> append -> persist as one unit.
    /// Operations never call each other, so a non-reentrant mutex is enough.
    lock: Mutex<()>,
    insert_delay: Duration,
}

impl RecordStore {
    pub fn new(document: Arc<dyn DocumentStore>, insert_delay: Duration) -> Self {
        Self {
            document,
            lock: Mutex::new(()),
            insert_delay,
        }
    }

    /// Create the backing document if it does not exist yet.
    pub async fn open(
        document: Arc<dyn DocumentStore>,
        insert_delay: Duration,
    ) -> Result<Self, CatalogError> {
        document.ensure_exists().await?;
        Ok(Self::new(document, insert_delay))
    }

    /// Append a record unless `id` is already present.
    ///
    /// Returns the new position (the size of the store right before this
    /// commit), or `-1` for a duplicate id. The artificial delay runs while
    /// the lock is held, so every other operation waits behind it.
    pub async fn insert(&self, id: &str, name: &str, price: f64) -> Result<Position, CatalogError> {
        let _guard = self.lock.lock().await;
        info!(id, "insert started");

        if !self.insert_delay.is_zero() {
            tokio::time::sleep(self.insert_delay).await;
        }

        let mut records = self.document.load().await?;
        let existing = position_of(&records, id);
        if existing != NOT_FOUND {
            info!(id, existing, "id already present; nothing inserted");
            return Ok(NOT_FOUND);
        }

        records.push(Record::new(id, name, price));
        let position = (records.len() - 1) as Position;
        self.document.save(&records).await?;

        info!(id, position, "insert committed");
        Ok(position)
    }

    /// Position of `id`, or `-1` if absent.
    pub async fn query(&self, id: &str) -> Result<Position, CatalogError> {
        let _guard = self.lock.lock().await;
        debug!(id, "query started");

        let records = self.document.load().await?;
        let position = position_of(&records, id);
        if position == NOT_FOUND {
            info!(id, "query: not found");
        } else {
            info!(id, position, "query: found");
        }
        Ok(position)
    }

    /// Current contents, read under the same lock as the operations.
    pub async fn snapshot(&self) -> Result<Vec<Record>, CatalogError> {
        let _guard = self.lock.lock().await;
        self.document.load().await
    }

    pub async fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.snapshot().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.len().await? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryDocument, JsonFileDocument};
    use tokio::time::Instant;

    fn store_with(doc: Arc<InMemoryDocument>, delay: Duration) -> Arc<RecordStore> {
        Arc::new(RecordStore::new(doc, delay))
    }

    fn instant_store() -> (Arc<InMemoryDocument>, Arc<RecordStore>) {
        let doc = Arc::new(InMemoryDocument::new());
        let store = store_with(Arc::clone(&doc), Duration::ZERO);
        (doc, store)
    }

    #[tokio::test]
    async fn empty_store_inserts_at_zero_and_queries_miss() {
        let (_, store) = instant_store();
        assert_eq!(store.query("A").await.unwrap(), NOT_FOUND);
        assert_eq!(store.insert("A", "Mouse", 10.0).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fresh_insert_returns_current_size_and_query_agrees() {
        let doc = Arc::new(InMemoryDocument::with_records(vec![
            Record::new("A", "Mouse", 10.0),
            Record::new("B", "Keyboard", 25.5),
        ]));
        let store = store_with(doc, Duration::ZERO);

        assert_eq!(store.insert("X", "Cam", 50.0).await.unwrap(), 2);
        assert_eq!(store.query("X").await.unwrap(), 2);
        assert_eq!(store.query("A").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_insert_returns_sentinel_without_mutation() {
        let (doc, store) = instant_store();
        assert_eq!(store.insert("A", "Mouse", 10.0).await.unwrap(), 0);
        assert_eq!(store.insert("A", "Other", 99.0).await.unwrap(), NOT_FOUND);

        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(doc.save_count(), 1);
        assert_eq!(store.snapshot().await.unwrap()[0].name, "Mouse");
    }

    #[tokio::test]
    async fn query_never_inserted_id_misses_on_non_empty_store() {
        let (_, store) = instant_store();
        store.insert("A", "Mouse", 10.0).await.unwrap();
        assert_eq!(store.query("nope").await.unwrap(), NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_distinct_inserts_form_a_permutation() {
        let (_, store) = instant_store();
        let n = 16;

        let handles: Vec<_> = (0..n)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(&format!("id-{i}"), "item", i as f64).await })
            })
            .collect();

        let mut positions = Vec::new();
        for h in handles {
            positions.push(h.await.unwrap().unwrap());
        }
        positions.sort_unstable();

        assert_eq!(positions, (0..n as Position).collect::<Vec<_>>());
        assert_eq!(store.len().await.unwrap(), n);
    }

    #[tokio::test]
    async fn query_waits_for_in_flight_insert() {
        let doc = Arc::new(InMemoryDocument::new());
        let store = store_with(doc, Duration::from_millis(200));

        let insert = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.insert("A", "Mouse", 10.0).await }
        });
        // let the insert take the lock first
        tokio::time::sleep(Duration::from_millis(20)).await;

        let started = Instant::now();
        assert_eq!(store.query("A").await.unwrap(), 0);
        assert!(started.elapsed() >= Duration::from_millis(150));
        assert_eq!(insert.await.unwrap().unwrap(), 0);
    }

    #[tokio::test]
    async fn back_to_back_inserts_are_serialized() {
        let delay = Duration::from_millis(150);
        let store = store_with(Arc::new(InMemoryDocument::new()), delay);

        let started = Instant::now();
        let (a, b) = tokio::join!(store.insert("A", "Mouse", 10.0), store.insert("B", "Cam", 50.0));
        let elapsed = started.elapsed();

        let mut got = vec![a.unwrap(), b.unwrap()];
        got.sort_unstable();
        assert_eq!(got, vec![0, 1]);
        assert!(elapsed >= delay * 2, "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn storage_failure_is_contained_and_releases_the_lock() {
        let (doc, store) = instant_store();
        store.insert("A", "Mouse", 10.0).await.unwrap();

        doc.fail_loads(true);
        assert!(matches!(store.query("A").await, Err(CatalogError::Storage(_))));
        assert!(matches!(store.insert("B", "Cam", 1.0).await, Err(CatalogError::Storage(_))));

        doc.fail_loads(false);
        assert_eq!(store.insert("B", "Cam", 1.0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reopened_file_store_keeps_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        {
            let doc = Arc::new(JsonFileDocument::new(&path));
            let store = RecordStore::open(doc, Duration::ZERO).await.unwrap();
            for (i, id) in ["A", "B", "C"].iter().enumerate() {
                assert_eq!(store.insert(id, "item", 1.0).await.unwrap(), i as Position);
            }
        }

        let doc = Arc::new(JsonFileDocument::new(&path));
        let store = RecordStore::open(doc, Duration::ZERO).await.unwrap();
        assert_eq!(store.query("A").await.unwrap(), 0);
        assert_eq!(store.query("B").await.unwrap(), 1);
        assert_eq!(store.query("C").await.unwrap(), 2);
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn out_of_band_edits_are_observed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let doc = Arc::new(JsonFileDocument::new(&path));
        let store = RecordStore::open(Arc::clone(&doc) as Arc<dyn DocumentStore>, Duration::ZERO)
            .await
            .unwrap();

        doc.save(&[Record::new("ext", "External", 5.0)]).await.unwrap();

        assert_eq!(store.query("ext").await.unwrap(), 0);
        assert_eq!(store.insert("A", "Mouse", 10.0).await.unwrap(), 1);
    }
}
