//! Responder port - 元の接続への返信ハンドル

use async_trait::async_trait;

use crate::domain::Response;
use crate::error::CatalogError;

/// Handle to the connection a request arrived on.
///
/// The worker that completes a task owns it and consumes it exactly once:
/// `respond` writes the reply and closes, `close` drops the peer without a
/// reply (used for tasks abandoned at shutdown).
#[async_trait]
pub trait Responder: Send {
    async fn respond(self: Box<Self>, response: &Response) -> Result<(), CatalogError>;

    async fn close(self: Box<Self>);

    /// Peer description for logs.
    fn peer(&self) -> String {
        "unknown".to_string()
    }
}
