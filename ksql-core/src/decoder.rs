use crate::{Error, KsqlError, Result};
use async_stream::try_stream;
use bytes::Bytes;
use futures::{Stream, TryStreamExt, stream};
use serde_json::Value;
use std::{borrow::Cow, fmt::Display, pin::pin, str::FromStr};

/// One row emitted by a streaming query.
pub type StreamedRow = Value;

pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Keep alive sent by the engine while a query has no rows to emit.
const HEARTBEAT: &[u8] = b"\n";

/// Text encoding of the streamed body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1, every byte is one character.
    Latin1,
}

impl Encoding {
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> std::result::Result<Cow<'a, str>, std::str::Utf8Error> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).map(Cow::Borrowed),
            Encoding::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
        }
    }

    /// Re-encode `bytes` as UTF-8 without validating it.
    fn transcode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            Encoding::Utf8 => Cow::Borrowed(bytes),
            Encoding::Latin1 => Cow::Owned(
                bytes
                    .iter()
                    .map(|&b| b as char)
                    .collect::<String>()
                    .into_bytes(),
            ),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            _ => Err(Error::msg(format!("Unsupported encoding `{}`", s))),
        }
    }
}

/// How the bytes of a streamed body are split into JSON documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// Every row must fit in `chunk_size` bytes.
    ///
    /// Pieces cut by the network inside a row are joined back while the row
    /// is shorter than `chunk_size`. A row larger than `chunk_size` fails with
    /// [`KsqlError::IncompleteFrame`].
    #[default]
    Chunk,
    /// Accumulate bytes until complete documents parse. Whitespace between
    /// documents, heartbeats included, is skipped.
    Buffered,
}

/// Parameters of a streaming query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub encoding: Encoding,
    pub chunk_size: usize,
    pub framing: Framing,
}

impl QueryOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            chunk_size: DEFAULT_CHUNK_SIZE,
            framing: Framing::Chunk,
        }
    }
}

/// Split every chunk of `chunks` into pieces of at most `chunk_size` bytes.
///
/// Pieces never span two input chunks.
pub fn split_chunks<S>(chunks: S, chunk_size: usize) -> impl Stream<Item = Result<Bytes>> + Send
where
    S: Stream<Item = Result<Bytes>> + Send,
{
    let chunk_size = chunk_size.max(1);
    chunks
        .map_ok(move |mut chunk| {
            let mut pieces = Vec::with_capacity(chunk.len().div_ceil(chunk_size));
            while chunk.len() > chunk_size {
                pieces.push(chunk.split_to(chunk_size));
            }
            if !chunk.is_empty() {
                pieces.push(chunk);
            }
            stream::iter(pieces.into_iter().map(Ok::<_, Error>))
        })
        .try_flatten()
}

/// Lazily decode the rows of a streamed body.
///
/// The stream ends when `chunks` ends or right after the first error is
/// yielded. Dropping it drops `chunks`, releasing the connection.
pub fn decode_rows<S>(chunks: S, options: QueryOptions) -> impl Stream<Item = Result<StreamedRow>> + Send
where
    S: Stream<Item = Result<Bytes>> + Send,
{
    let QueryOptions {
        encoding,
        chunk_size,
        framing,
    } = options;
    try_stream! {
        match framing {
            Framing::Chunk => {
                let mut pieces = pin!(split_chunks(chunks, chunk_size));
                let mut pending = Vec::<u8>::new();
                while let Some(piece) = pieces.try_next().await? {
                    if pending.is_empty() && piece.as_ref() == HEARTBEAT {
                        log::trace!("Skipping heartbeat");
                        continue;
                    }
                    pending.extend_from_slice(&piece);
                    if pending.len() > chunk_size {
                        Err::<(), _>(incomplete(
                            pending.len(),
                            chunk_size,
                            "the row is larger than the chunk size",
                        ))?;
                    }
                    match decode_piece(&pending, encoding) {
                        Ok(row) => {
                            pending.clear();
                            yield row;
                        }
                        Err(e) if e.truncated && pending.len() < chunk_size => {
                            log::trace!("Row cut after {} bytes, waiting for more", pending.len());
                        }
                        Err(e) => {
                            Err::<(), _>(incomplete(pending.len(), chunk_size, e.reason))?;
                        }
                    }
                }
                if !pending.is_empty() {
                    Err::<(), _>(incomplete(
                        pending.len(),
                        chunk_size,
                        "the body ended inside a row",
                    ))?;
                }
            }
            Framing::Buffered => {
                let mut chunks = pin!(chunks);
                let mut buffer = Vec::<u8>::new();
                while let Some(chunk) = chunks.try_next().await? {
                    buffer.extend_from_slice(&encoding.transcode(&chunk));
                    let (rows, consumed) = drain_documents(&buffer, chunk_size)?;
                    buffer.drain(..consumed);
                    for row in rows {
                        yield row;
                    }
                }
                if buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                    Err::<(), _>(incomplete(
                        buffer.len(),
                        chunk_size,
                        "the body ended inside a document",
                    ))?;
                }
            }
        }
    }
}

/// Why a piece is not a row.
struct Undecodable {
    /// The piece is the start of a row, more bytes may complete it.
    truncated: bool,
    reason: String,
}

fn decode_piece(piece: &[u8], encoding: Encoding) -> std::result::Result<StreamedRow, Undecodable> {
    let text = encoding.decode(piece).map_err(|e| Undecodable {
        truncated: e.error_len().is_none(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| Undecodable {
        truncated: e.is_eof(),
        reason: e.to_string(),
    })
}

/// Parse every complete document at the start of `buffer`, returns them
/// together with the number of bytes they took.
fn drain_documents(
    buffer: &[u8],
    chunk_size: usize,
) -> std::result::Result<(Vec<StreamedRow>, usize), KsqlError> {
    let mut documents = serde_json::Deserializer::from_slice(buffer).into_iter::<Value>();
    let mut rows = Vec::new();
    loop {
        match documents.next() {
            Some(Ok(row)) => rows.push(row),
            Some(Err(e)) if e.is_eof() => break,
            Some(Err(e)) => return Err(incomplete(buffer.len(), chunk_size, e)),
            None => break,
        }
    }
    Ok((rows, documents.byte_offset()))
}

fn incomplete(len: usize, chunk_size: usize, reason: impl Display) -> KsqlError {
    KsqlError::IncompleteFrame {
        len,
        chunk_size,
        reason: reason.to_string(),
    }
}
