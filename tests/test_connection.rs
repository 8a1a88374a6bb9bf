mod common;

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use common::{POST_WITH_BODY, SIMPLE_GET};
use rawhttp::http::connection::{BufferedWriter, Connection, Handler, HandlerError};
use rawhttp::http::request::Request;
use rawhttp::http::response::{StatusCode, default_headers};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

fn echo(w: &mut BufferedWriter, req: &Request) -> anyhow::Result<()> {
    w.write_status_line(StatusCode::Ok)?;
    w.write_headers(&default_headers(req.body.len()))?;
    w.write_body(&req.body)?;
    Ok(())
}

fn reject(_w: &mut BufferedWriter, _req: &Request) -> anyhow::Result<()> {
    Err(HandlerError::new(StatusCode::BadRequest, "Your request was rejected\n").into())
}

fn explode(_w: &mut BufferedWriter, _req: &Request) -> anyhow::Result<()> {
    anyhow::bail!("database unavailable")
}

fn out_of_order(w: &mut BufferedWriter, _req: &Request) -> anyhow::Result<()> {
    w.write_status_line(StatusCode::Ok)?;
    w.write_body(b"no headers")?;
    Ok(())
}

fn unfinished(w: &mut BufferedWriter, _req: &Request) -> anyhow::Result<()> {
    w.write_status_line(StatusCode::Ok)?;
    w.write_headers(&default_headers(0))?;
    Ok(())
}

/// Sends `request`, closes the write half and collects everything the
/// connection answers.
async fn exchange<H: Handler>(handler: H, request: &[u8]) -> String {
    let (mut client, server) = tokio::io::duplex(64);
    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, Arc::new(handler));
        conn.run().await
    });

    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    task.await.unwrap().unwrap();

    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_handler_response_is_sent() {
    let response = exchange(echo, POST_WITH_BODY).await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Length: 13\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert!(response.ends_with("\r\n\r\nhello, world!"));
}

#[tokio::test]
async fn test_parse_error_answered_with_400() {
    let response = exchange(echo, b"get / HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("method must be uppercase ASCII letters: \"get\""));
}

#[tokio::test]
async fn test_truncated_request_answered_with_400() {
    let response = exchange(echo, b"POST / HTTP/1.1\r\nContent-Length: 9\r\n\r\nabc").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.contains("incomplete request"));
}

#[tokio::test]
async fn test_handler_error_becomes_response() {
    let response = exchange(reject, SIMPLE_GET).await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("Your request was rejected\n"));
}

#[tokio::test]
async fn test_other_handler_error_is_500() {
    let response = exchange(explode, SIMPLE_GET).await;

    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(!response.contains("database"));
}

#[tokio::test]
async fn test_write_order_violation_aborts_without_response() {
    let response = exchange(out_of_order, SIMPLE_GET).await;

    assert!(response.is_empty());
}

#[tokio::test]
async fn test_unfinished_response_is_not_sent() {
    let response = exchange(unfinished, SIMPLE_GET).await;

    assert!(response.is_empty());
}

#[tokio::test]
async fn test_closure_handler() {
    let handler = |w: &mut BufferedWriter, req: &Request| -> anyhow::Result<()> {
        let body = format!("you asked for {}", req.target());
        let mut headers = default_headers(body.len());
        headers.replace("Content-Type", "text/html");
        w.write_status_line(StatusCode::Ok)?;
        w.write_headers(&headers)?;
        w.write_body(body.as_bytes())?;
        Ok(())
    };

    let response = exchange(handler, b"GET /menu HTTP/1.1\r\n\r\n").await;

    assert!(response.contains("Content-Type: text/html\r\n"));
    assert!(response.ends_with("you asked for /menu"));
}

/// Stream whose reads fail while writes still go through.
struct ResetOnRead {
    written: Arc<Mutex<Vec<u8>>>,
}

impl AsyncRead for ResetOnRead {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )))
    }
}

impl AsyncWrite for ResetOnRead {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_read_failure_still_answered_with_400() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let stream = ResetOnRead {
        written: Arc::clone(&written),
    };

    let mut conn = Connection::new(stream, Arc::new(echo));
    conn.run().await.unwrap();

    let response = String::from_utf8(written.lock().unwrap().clone()).unwrap();
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("connection reset by peer"));
}
