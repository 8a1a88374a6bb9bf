use std::io::Write;

use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Which part of the response the writer accepts next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    ExpectStatusLine,
    ExpectHeaders,
    ExpectBody,
    Complete,
}

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("wrong write order: called in state {actual:?}, valid only in {expected:?}")]
    WrongOrder {
        expected: WriterState,
        actual: WriterState,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes a response onto `W`, enforcing status line, then headers, then
/// body.
///
/// The state advances before the bytes are written, so a failed write
/// cannot be retried on the same writer.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    inner: W,
    state: WriterState,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            state: WriterState::ExpectStatusLine,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == WriterState::Complete
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn transition(&mut self, expected: WriterState) -> Result<(), WriterError> {
        if self.state != expected {
            return Err(WriterError::WrongOrder {
                expected,
                actual: self.state,
            });
        }

        self.state = match expected {
            WriterState::ExpectStatusLine => WriterState::ExpectHeaders,
            WriterState::ExpectHeaders => WriterState::ExpectBody,
            WriterState::ExpectBody | WriterState::Complete => WriterState::Complete,
        };
        Ok(())
    }

    pub fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriterError> {
        self.transition(WriterState::ExpectStatusLine)?;

        write!(
            self.inner,
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        )?;
        Ok(())
    }

    pub fn write_headers(&mut self, headers: &Headers) -> Result<(), WriterError> {
        self.transition(WriterState::ExpectHeaders)?;

        let mut buf = Vec::new();
        for (k, v) in headers.iter() {
            buf.extend_from_slice(k.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(v.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"\r\n");

        self.inner.write_all(&buf)?;
        Ok(())
    }

    pub fn write_body(&mut self, body: &[u8]) -> Result<(), WriterError> {
        self.transition(WriterState::ExpectBody)?;

        self.inner.write_all(body)?;
        Ok(())
    }
}
