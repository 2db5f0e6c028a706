use bytes::Bytes;
use futures::Stream;
use ksql::{Error, KsqlError, Request, Response, Result, Transport};
use serde_json::Value;
use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};

/// What the mock answers to one request.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond {
        status: u16,
        chunks: Vec<std::result::Result<Bytes, KsqlError>>,
    },
    Fail(KsqlError),
}

/// [`Transport`] answering from a script, one entry per request.
///
/// Records every request and counts the bodies released by their consumer.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Request>>,
    released: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, scripted: Scripted) -> Self {
        self.script
            .lock()
            .expect("Script lock poisoned")
            .push_back(scripted);
        self
    }

    /// Answer with `document` as the whole body.
    pub fn respond_json(self, status: u16, document: Value) -> Self {
        self.then(Scripted::Respond {
            status,
            chunks: vec![Ok(document.to_string().into())],
        })
    }

    /// Answer 200 with the body split in exactly these chunks.
    pub fn respond_chunks<C: Into<Bytes>>(self, chunks: impl IntoIterator<Item = C>) -> Self {
        self.then(Scripted::Respond {
            status: 200,
            chunks: chunks.into_iter().map(|v| Ok(v.into())).collect(),
        })
    }

    pub fn fail(self, error: KsqlError) -> Self {
        self.then(Scripted::Fail(error))
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("Requests lock poisoned").len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("Requests lock poisoned").clone()
    }

    /// Number of response bodies dropped by their consumer.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    type Body = MockBody;

    async fn send(&self, request: Request) -> Result<Response<Self::Body>> {
        log::debug!("MockTransport received {:?}", request.statement);
        self.requests
            .lock()
            .expect("Requests lock poisoned")
            .push(request);
        let next = self.script.lock().expect("Script lock poisoned").pop_front();
        match next {
            Some(Scripted::Respond { status, chunks }) => Ok(Response::new(
                status,
                MockBody {
                    chunks: chunks.into(),
                    released: self.released.clone(),
                },
            )),
            Some(Scripted::Fail(error)) => Err(error.into()),
            None => Err(Error::msg("MockTransport has no scripted answer left")),
        }
    }
}

/// Body of a scripted response.
#[derive(Debug)]
pub struct MockBody {
    chunks: VecDeque<std::result::Result<Bytes, KsqlError>>,
    released: Arc<AtomicUsize>,
}

impl Stream for MockBody {
    type Item = Result<Bytes>;
    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.chunks.pop_front().map(|v| v.map_err(Error::from)))
    }
}

impl Drop for MockBody {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
