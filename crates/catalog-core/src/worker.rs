use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{Operation, Position, Request, Response};
use crate::error::CatalogError;
use crate::impls::Queued;
use crate::store::RecordStore;
use crate::task::{DispatchQueue, Task};

/// Worker group handle.
/// - `request_shutdown()` でフラグを立てると、各ワーカーは次のポーリングで抜ける
/// - `join()` で全ワーカーの終了を待てる
///
/// Workers share no state of their own; mutual exclusion comes entirely from
/// the store's lock.
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers polling `queue` every `poll_interval`.
    pub fn spawn(
        n: usize,
        queue: Arc<DispatchQueue>,
        store: Arc<RecordStore>,
        poll_interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let q = Arc::clone(&queue);
            let s = Arc::clone(&store);
            let rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, q, s, poll_interval, rx).await;
            });
            info!(worker = worker_id, "worker started");
            joins.push(join);
        }

        Self { shutdown_tx, joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Request shutdown for all workers.
    /// In-flight tasks run to completion; this only stops taking new ones.
    pub fn request_shutdown(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for j in self.joins {
            if let Err(err) = j.await {
                warn!(error = %err, "worker task ended abnormally");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<DispatchQueue>,
    store: Arc<RecordStore>,
    poll_interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // timeout つきで待ち、毎回 shutdown フラグを確認する
        let Some(Queued {
            priority,
            seq,
            item: task,
        }) = queue.pop(poll_interval).await
        else {
            continue;
        };

        let Task { request, responder } = task;
        let peer = responder.peer();
        debug!(worker = worker_id, %priority, seq, %peer, operation = %request.operation, "task dequeued");

        let response = execute(&store, &request).await;

        if let Err(err) = responder.respond(&response).await {
            warn!(worker = worker_id, %peer, error = %err, "failed to deliver response");
        }
    }
    debug!(worker = worker_id, "worker stopped");
}

/// Run one request against the store and build its response.
///
/// Never fails: every error becomes a structured error response for this
/// request alone.
pub async fn execute(store: &RecordStore, request: &Request) -> Response {
    match run(store, request).await {
        Ok(position) => Response::success(position),
        Err(err) => {
            warn!(operation = %request.operation, error = %err, "request failed");
            Response::error(err.to_string())
        }
    }
}

async fn run(store: &RecordStore, request: &Request) -> Result<Position, CatalogError> {
    match Operation::from_request(request)? {
        Operation::Insert { id, name, price } => store.insert(&id, &name, price).await,
        Operation::Query { id } => store.query(&id).await,
    }
}
