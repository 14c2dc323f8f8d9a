//! DocumentStore port - 永続化された唯一の正本（source of truth）

use async_trait::async_trait;

use crate::domain::Record;
use crate::error::CatalogError;

/// Durable medium holding the ordered record sequence as one document.
///
/// The store reloads through this port inside every critical section, so an
/// implementation must not cache: `load` returns whatever was last `save`d,
/// including edits made out of band.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create an empty document if none exists yet. Existing content is kept.
    async fn ensure_exists(&self) -> Result<(), CatalogError>;

    async fn load(&self) -> Result<Vec<Record>, CatalogError>;

    /// Replace the whole document. Must be all-or-nothing.
    async fn save(&self, records: &[Record]) -> Result<(), CatalogError>;
}
