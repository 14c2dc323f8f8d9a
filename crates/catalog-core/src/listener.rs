//! Listener - 接続を受け付け、1 メッセージを読み、キューに積むだけ
//!
//! ドメインロジックは持たない。ストアのロックには決して触れない。

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::select;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::Request;
use crate::error::CatalogError;
use crate::impls::TcpResponder;
use crate::task::{DispatchQueue, submit};

pub struct Listener {
    listener: TcpListener,
    queue: Arc<DispatchQueue>,
    read_buffer: usize,
}

impl Listener {
    pub fn new(listener: TcpListener, queue: Arc<DispatchQueue>, read_buffer: usize) -> Self {
        Self {
            listener,
            queue,
            read_buffer,
        }
    }

    pub async fn bind(
        addr: impl ToSocketAddrs,
        queue: Arc<DispatchQueue>,
        read_buffer: usize,
    ) -> Result<Self, CatalogError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::new(listener, queue, read_buffer))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Handlers still reading when that happens are aborted and their sockets
    /// closed, so nothing is enqueued after this returns.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let Listener {
            listener,
            queue,
            read_buffer,
        } = self;
        tokio::pin!(shutdown);
        let mut handlers = JoinSet::new();

        loop {
            select! {
                _ = &mut shutdown => {
                    info!(in_flight = handlers.len(), "listener shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => {
                            spawn_connection_handler(&mut handlers, stream, peer, &queue, read_buffer);
                        }
                        Err(err) => warn!(error = ?err, "failed to accept connection"),
                    }
                }
                // 終わったハンドラーを回収する
                Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
            }
        }

        handlers.shutdown().await;
    }
}

fn spawn_connection_handler(
    handlers: &mut JoinSet<()>,
    stream: TcpStream,
    peer: SocketAddr,
    queue: &Arc<DispatchQueue>,
    read_buffer: usize,
) {
    let queue = Arc::clone(queue);
    handlers.spawn(async move {
        if let Err(err) = handle_connection(stream, peer, &queue, read_buffer).await {
            warn!(peer = %peer, error = %err, "connection dropped before enqueue");
        }
    });
}

/// Read exactly one message with a single bounded read, then enqueue.
///
/// An undecodable message closes the connection with no reply.
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    queue: &DispatchQueue,
    read_buffer: usize,
) -> Result<(), CatalogError> {
    debug!(%peer, "connection accepted");

    let mut buf = vec![0u8; read_buffer];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        debug!(%peer, "peer closed without sending a request");
        return Ok(());
    }

    let request = match Request::decode(&buf[..n]) {
        Ok(request) => request,
        Err(err) => {
            warn!(%peer, error = %err, "undecodable request; closing without reply");
            drop(stream);
            return Ok(());
        }
    };

    let priority = request.priority();
    let operation = request.operation.clone();
    let client_id = request.client_id.clone().unwrap_or_default();
    let seq = submit(queue, request, Box::new(TcpResponder::new(stream))).await;
    info!(%peer, %operation, %priority, seq, client_id = %client_id, "request enqueued");
    Ok(())
}
