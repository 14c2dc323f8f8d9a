use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use super::ServerConfig;
use crate::error::CatalogError;
use crate::impls::JsonFileDocument;
use crate::listener::Listener;
use crate::ports::DocumentStore;
use crate::store::RecordStore;
use crate::task::DispatchQueue;
use crate::worker::WorkerGroup;

/// A validated, not yet started server. Built by [`super::ServerBuilder`].
pub struct Server {
    config: ServerConfig,
    document: Option<Arc<dyn DocumentStore>>,
}

impl Server {
    pub(crate) fn new(config: ServerConfig, document: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { config, document }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the store, spawn the workers and bind the socket.
    pub async fn start(self) -> Result<RunningServer, CatalogError> {
        let Server { config, document } = self;

        let document = document.unwrap_or_else(|| {
            Arc::new(JsonFileDocument::new(config.store_path.clone())) as Arc<dyn DocumentStore>
        });
        let store = Arc::new(RecordStore::open(document, config.insert_delay).await?);

        let queue = Arc::new(DispatchQueue::new());
        let listener =
            Listener::bind(config.listen, Arc::clone(&queue), config.read_buffer).await?;
        let local_addr = listener.local_addr()?;

        let workers = WorkerGroup::spawn(
            config.workers,
            Arc::clone(&queue),
            Arc::clone(&store),
            config.poll_interval,
        );

        info!(
            addr = %local_addr,
            workers = config.workers,
            store = %config.store_path.display(),
            "catalog server listening"
        );

        Ok(RunningServer {
            local_addr,
            listener,
            workers,
            queue,
            store,
        })
    }
}

pub struct RunningServer {
    local_addr: SocketAddr,
    listener: Listener,
    workers: WorkerGroup,
    queue: Arc<DispatchQueue>,
    store: Arc<RecordStore>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn store(&self) -> Arc<RecordStore> {
        Arc::clone(&self.store)
    }

    pub fn queue(&self) -> Arc<DispatchQueue> {
        Arc::clone(&self.queue)
    }

    /// Serve until `shutdown` resolves, then stop the workers.
    ///
    /// Tasks still queued at that point are closed without a response.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let RunningServer {
            listener,
            workers,
            queue,
            ..
        } = self;

        listener.run_until(shutdown).await;
        workers.shutdown_and_join().await;

        let abandoned = queue.drain().await;
        if !abandoned.is_empty() {
            warn!(count = abandoned.len(), "abandoning queued requests at shutdown");
        }
        for queued in abandoned {
            queued.item.responder.close().await;
        }
        info!("catalog server stopped");
    }

    pub async fn run_until_ctrl_c(self) {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}
