use thiserror::Error;

/// Error taxonomy of the catalog server.
///
/// - `Decode`: protocol error. The listener drops the connection without a
///   reply; it never becomes a [`crate::domain::Response`].
/// - `UnknownOperation` / `InvalidParams`: domain errors, answered with a
///   structured error response.
/// - `Io` / `Corrupt` / `Storage`: durable medium failures, contained to
///   the one request that hit them.
///
/// Startup validation has its own type, [`crate::app::BuildError`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("undecodable message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid params for {operation}: {reason}")]
    InvalidParams {
        operation: &'static str,
        reason: String,
    },

    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored document is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Storage(String),
}

