use std::fmt;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::http::request::Request;

/// Size of the read buffer when a connection starts. It doubles whenever a
/// read would not fit.
pub const INITIAL_BUFFER_SIZE: usize = 8;

/// Where the input ended when the peer stopped sending before the request
/// was complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteKind {
    /// During the request line or the header section.
    Head,
    /// During the body, before `Content-Length` bytes arrived.
    Body { received: usize, declared: usize },
}

impl fmt::Display for IncompleteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncompleteKind::Head => f.write_str("input ended before headers were complete"),
            IncompleteKind::Body { received, declared } => write!(
                f,
                "input ended after {} of {} body bytes",
                received, declared
            ),
        }
    }
}

/// Everything that makes a request unparseable.
///
/// Needing more bytes is not represented here: parse steps report it by
/// consuming zero bytes.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line: expected 3 parts, found {0}")]
    RequestLineParts(usize),

    #[error("method must be uppercase ASCII letters: {0:?}")]
    MethodNotUppercase(String),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("malformed request target")]
    EmptyTarget,

    #[error("malformed http version: {0:?}")]
    MalformedVersion(String),

    #[error("unsupported http version: {0:?}")]
    UnsupportedVersion(String),

    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    #[error("malformed header line: {0:?}")]
    MalformedHeaderLine(String),

    #[error("malformed Content-Length: {0:?}")]
    InvalidContentLength(String),

    #[error("body exceeds declared length: got {received} bytes, expected {declared}")]
    BodyTooLarge { received: usize, declared: usize },

    #[error("parser invoked after completion")]
    AfterDone,

    #[error("incomplete request: {0}")]
    Incomplete(IncompleteKind),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// True when the peer stopped sending before the request was complete.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseError::Incomplete(_))
    }
}

/// Growable read region with a cursor marking the end of valid data.
///
/// Parsed bytes are shifted out of the front after every pass, so the
/// region always starts at the first unconsumed byte.
#[derive(Debug)]
pub struct ReadBuffer {
    buf: BytesMut,
    len: usize,
}

impl ReadBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::zeroed(capacity.max(1)),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Valid bytes that have not been consumed yet.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Free space for the next read, doubling the region first if it is full.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        if self.len == self.buf.len() {
            let doubled = self.buf.len() * 2;
            self.buf.resize(doubled, 0);
        }
        &mut self.buf[self.len..]
    }

    /// Marks `n` freshly read bytes as valid.
    pub fn advance(&mut self, n: usize) {
        assert!(self.len + n <= self.buf.len(), "advanced past the buffer end");
        self.len += n;
    }

    /// Drops the first `n` valid bytes and moves the rest to the front.
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.len, "consumed more than was read");
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }
}

/// Reads from `reader` until a complete request has been parsed.
///
/// Bytes are handed to the parser as they arrive, so any fragmentation of
/// the input produces the same request. End of input before the request is
/// complete yields [`ParseError::Incomplete`].
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = ReadBuffer::with_capacity(INITIAL_BUFFER_SIZE);
    let mut request = Request::new();

    while !request.is_done() {
        let n = reader.read(buffer.unfilled_mut()).await?;

        if n == 0 {
            return Err(ParseError::Incomplete(request.incomplete_kind()));
        }

        buffer.advance(n);
        let consumed = request.parse(buffer.filled())?;
        buffer.consume(consumed);

        debug!(
            read = n,
            consumed,
            pending = buffer.filled().len(),
            state = ?request.state(),
            "parse pass"
        );
    }

    Ok(request)
}
