use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use crate::domain::Response;
use crate::error::CatalogError;
use crate::ports::Responder;

/// The still-open client socket, carried through the queue to a worker.
#[derive(Debug)]
pub struct TcpResponder {
    stream: TcpStream,
    peer: Option<SocketAddr>,
}

impl TcpResponder {
    pub fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self { stream, peer }
    }
}

#[async_trait]
impl Responder for TcpResponder {
    async fn respond(self: Box<Self>, response: &Response) -> Result<(), CatalogError> {
        let encoded = serde_json::to_vec(response).map_err(CatalogError::Encode)?;
        let mut stream = self.stream;
        stream.write_all(&encoded).await?;
        stream.flush().await?;
        // One message per connection: the server closes after replying.
        stream.shutdown().await?;
        Ok(())
    }

    async fn close(self: Box<Self>) {
        let TcpResponder { mut stream, peer } = *self;
        if let Err(err) = stream.shutdown().await {
            debug!(peer = ?peer, error = %err, "shutdown on close failed");
        }
    }

    fn peer(&self) -> String {
        self.peer
            .map_or_else(|| "unknown".to_string(), |addr| addr.to_string())
    }
}
