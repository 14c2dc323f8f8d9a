//! JsonFileDocument - ファイル 1 つに全レコードを保存する

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Record;
use crate::error::CatalogError;
use crate::ports::DocumentStore;

/// On-disk shape: `{ "records": [ { "id", "name", "price" }, ... ] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    records: Vec<Record>,
}

/// File-backed [`DocumentStore`].
///
/// `save` writes a sibling `<name>.tmp` and renames it over the target, so
/// readers (including an external inspector) see either the old or the new
/// document, never a torn one.
#[derive(Debug, Clone)]
pub struct JsonFileDocument {
    path: PathBuf,
}

impl JsonFileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("catalog"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentStore for JsonFileDocument {
    async fn ensure_exists(&self) -> Result<(), CatalogError> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(path = %self.path.display(), "creating empty document");
        self.save(&[]).await
    }

    async fn load(&self) -> Result<Vec<Record>, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let doc: Document = serde_json::from_slice(&bytes).map_err(CatalogError::Corrupt)?;
        Ok(doc.records)
    }

    async fn save(&self, records: &[Record]) -> Result<(), CatalogError> {
        #[derive(Serialize)]
        struct DocumentRef<'a> {
            records: &'a [Record],
        }

        let mut bytes =
            serde_json::to_vec_pretty(&DocumentRef { records }).map_err(CatalogError::Encode)?;
        bytes.push(b'\n');

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
