//! Shared test helpers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

pub const SIMPLE_GET: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";

pub const POST_WITH_BODY: &[u8] = b"POST /submit HTTP/1.1\r\n\
Host: localhost:42069\r\n\
User-Agent: curl/7.81.0\r\n\
Set-Person: Si\r\n\
set-person: San\r\n\
Content-Length: 13\r\n\
\r\n\
hello, world!";

/// Reader that hands out its data in fixed pieces, one piece per read,
/// the way a socket delivers a request in fragments.
pub struct ChunkReader {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkReader {
    /// Splits `data` into pieces of at most `size` bytes.
    pub fn new(data: &[u8], size: usize) -> Self {
        Self {
            chunks: data.chunks(size.max(1)).map(<[u8]>::to_vec).collect(),
        }
    }

    /// Delivers `data` in two reads, split at `at`.
    pub fn split_at(data: &[u8], at: usize) -> Self {
        let (head, tail) = data.split_at(at);
        Self {
            chunks: [head, tail]
                .into_iter()
                .filter(|c| !c.is_empty())
                .map(<[u8]>::to_vec)
                .collect(),
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if let Some(mut chunk) = this.chunks.pop_front() {
            let n = chunk.len().min(buf.remaining());
            buf.put_slice(&chunk[..n]);
            if n < chunk.len() {
                this.chunks.push_front(chunk.split_off(n));
            }
        }

        Poll::Ready(Ok(()))
    }
}
