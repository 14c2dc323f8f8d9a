//! ChannelResponder - ソケットを使わずにワーカーを動かすための返信ハンドル

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::domain::Response;
use crate::error::CatalogError;
use crate::ports::Responder;

/// What happened to the connection on the worker side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Responded(Response),
    Closed,
}

/// [`Responder`] that hands the outcome to a oneshot receiver.
#[derive(Debug)]
pub struct ChannelResponder {
    label: String,
    tx: oneshot::Sender<Reply>,
}

impl ChannelResponder {
    pub fn pair(label: impl Into<String>) -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                label: label.into(),
                tx,
            },
            rx,
        )
    }
}

#[async_trait]
impl Responder for ChannelResponder {
    async fn respond(self: Box<Self>, response: &Response) -> Result<(), CatalogError> {
        let Self { label, tx } = *self;
        tx.send(Reply::Responded(response.clone())).map_err(|_| {
            CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("{label} hung up"),
            ))
        })
    }

    async fn close(self: Box<Self>) {
        // ignore send error: receiver may already be dropped
        let _ = self.tx.send(Reply::Closed);
    }

    fn peer(&self) -> String {
        self.label.clone()
    }
}
