//! HTTP/1.1 protocol implementation.
//!
//! Requests are parsed incrementally straight off the socket and responses
//! are written through an order-enforcing writer. One request is served per
//! connection; there is no keep-alive.
//!
//! # Architecture
//!
//! - **`headers`**: Case-insensitive header collection and header line parsing
//! - **`request`**: Request line, method set and the request parse state machine
//! - **`parser`**: Parse errors, the growable read buffer and the async read loop
//! - **`response`**: Status codes, default headers and whole-response helpers
//! - **`writer`**: Response writer enforcing status line → headers → body
//! - **`connection`**: Per-connection glue between parser, handler and writer
//!
//! # Request State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │    Start    │ ← Wait for the request line
//!        └──────┬──────┘
//!               │ "METHOD SP TARGET SP HTTP/1.1 CRLF"
//!               ▼
//!        ┌──────────────────┐
//!        │  ParsingHeaders  │ ← One header line per step
//!        └──────┬───────────┘
//!               │ blank line
//!               ├─ no Content-Length → Done
//!               ▼
//!        ┌──────────────────┐
//!        │   ParsingBody    │ ← Until Content-Length bytes arrived
//!        └──────┬───────────┘
//!               ▼
//!             Done
//! ```
//!
//! # Example
//!
//! ```no_run
//! use rawhttp::http::connection::BufferedWriter;
//! use rawhttp::http::request::Request;
//! use rawhttp::http::response::{StatusCode, default_headers};
//! use rawhttp::server::Server;
//!
//! fn hello(w: &mut BufferedWriter, _req: &Request) -> anyhow::Result<()> {
//!     let body = b"hello\n";
//!     w.write_status_line(StatusCode::Ok)?;
//!     w.write_headers(&default_headers(body.len()))?;
//!     w.write_body(body)?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = Server::serve("127.0.0.1:42069", hello).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.close();
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
