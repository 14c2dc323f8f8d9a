//! Client - 1 接続で 1 リクエストを送り、1 レスポンスを受け取る

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::domain::{Request, Response};
use crate::error::CatalogError;

/// Send `request` and wait for the server to reply and close.
///
/// A connection closed with no bytes (the server's answer to an
/// undecodable request) is reported as `UnexpectedEof`.
pub async fn call(addr: SocketAddr, request: &Request) -> Result<Response, CatalogError> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(&request.encode()?).await?;
    stream.flush().await?;
    // half-close: the request is complete, the read side stays open for the reply
    stream.shutdown().await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    if buf.is_empty() {
        return Err(CatalogError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed without response",
        )));
    }
    serde_json::from_slice(&buf).map_err(CatalogError::Decode)
}

pub async fn insert(
    addr: SocketAddr,
    id: &str,
    name: &str,
    price: f64,
) -> Result<Response, CatalogError> {
    call(addr, &Request::insert(id, name, price)).await
}

pub async fn query(addr: SocketAddr, id: &str) -> Result<Response, CatalogError> {
    call(addr, &Request::query(id)).await
}

