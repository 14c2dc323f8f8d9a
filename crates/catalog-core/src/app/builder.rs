//! ServerBuilder - サーバーの構築と起動前検証
//!
//! # Fail-fast 設計
//! - build() 時に設定を検証し、不正なら BuildError を返す
//! - ソケットやファイルに触れるのは Server::start() から

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{Server, ServerConfig};
use crate::ports::DocumentStore;

/// BuildError はサーバー構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("read buffer must be at least 1 byte")]
    EmptyReadBuffer,

    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
}

/// ServerBuilder は設定を集めて Server を生成
///
/// # 使用例
/// ```ignore
/// let server = ServerBuilder::new()
///     .listen("127.0.0.1:0".parse()?)
///     .workers(3)
///     .insert_delay(Duration::from_millis(100))
///     .build()?;
/// let running = server.start().await?;
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    config: ServerConfig,
    document: Option<Arc<dyn DocumentStore>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            config,
            document: None,
        }
    }

    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.config.listen = addr;
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store_path = path.into();
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n;
        self
    }

    pub fn insert_delay(mut self, delay: Duration) -> Self {
        self.config.insert_delay = delay;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn read_buffer(mut self, bytes: usize) -> Self {
        self.config.read_buffer = bytes;
        self
    }

    /// Use `document` instead of the JSON file at `store_path`.
    pub fn document(mut self, document: Arc<dyn DocumentStore>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn build(self) -> Result<Server, BuildError> {
        if self.config.workers == 0 {
            return Err(BuildError::NoWorkers);
        }
        if self.config.read_buffer == 0 {
            return Err(BuildError::EmptyReadBuffer);
        }
        if self.config.poll_interval.is_zero() {
            return Err(BuildError::ZeroPollInterval);
        }
        Ok(Server::new(self.config, self.document))
    }
}
