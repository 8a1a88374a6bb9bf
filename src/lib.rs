//! rawhttp - HTTP/1.1 over plain TCP
//!
//! Incremental request parsing and order-enforcing response writing on top
//! of a byte stream, plus a small task-per-connection server.

pub mod config;
pub mod http;
pub mod server;
