use crate::{KsqlError, Request, Result};
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use serde_json::Value;
use std::future::Future;

pub const STATUS_OK: u16 = 200;

/// Issues the HTTP calls of a [`Client`](crate::Client).
///
/// Implementations send `request` as `POST {base_url}/{endpoint}` with the
/// JSON body of [`Request::to_json`] and the `Accept`/`Content-Type` headers
/// set to `application/json`. An elapsed deadline, while connecting or while
/// reading the body, must surface as [`KsqlError::Timeout`]. No retries
/// happen at this layer.
pub trait Transport: Send + Sync {
    type Body: Stream<Item = Result<Bytes>> + Send + Unpin + 'static;

    /// Send the request and return as soon as the status is known, the body
    /// is left unread.
    fn send(&self, request: Request) -> impl Future<Output = Result<Response<Self::Body>>> + Send;
}

/// Status and still unread body of a response.
pub struct Response<B> {
    pub status: u16,
    pub body: B,
}

impl<B> Response<B>
where
    B: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    pub fn new(status: u16, body: B) -> Self {
        Self { status, body }
    }

    /// Collect the whole body.
    pub async fn bytes(mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        while let Some(chunk) = self.body.try_next().await? {
            bytes.extend_from_slice(chunk.as_ref());
        }
        Ok(bytes)
    }

    /// Collect the body of a buffered call, statuses other than 200 fail
    /// with [`KsqlError::Transport`] carrying the raw body.
    pub async fn json(self) -> Result<Value> {
        let status = self.status;
        let bytes = self.bytes().await?;
        if status != STATUS_OK {
            return Err(KsqlError::Transport {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }
            .into());
        }
        Ok(serde_json::from_slice(&bytes).map_err(|e| {
            KsqlError::MalformedResponse(format!("The body is not a JSON document: {}", e))
        })?)
    }
}
