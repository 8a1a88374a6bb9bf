use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::http::parser::read_request;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{ResponseWriter, WriterError};

/// Writer handed to business handlers. Output is buffered and only sent
/// once the handler has written a complete response.
pub type BufferedWriter = ResponseWriter<Vec<u8>>;

/// Business logic invoked once per parsed request.
///
/// The handler must drive the writer through status line, headers and body.
/// Returning a [`HandlerError`] sends that error as the response instead;
/// any other error is answered with 500.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, w: &mut BufferedWriter, req: &Request) -> anyhow::Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut BufferedWriter, &Request) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn handle(&self, w: &mut BufferedWriter, req: &Request) -> anyhow::Result<()> {
        self(w, req)
    }
}

/// An error a handler wants sent to the client as-is.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: impl Into<StatusCode>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn to_response(&self) -> Response {
        Response::new(self.status, self.message.clone())
    }
}

pub struct Connection<S, H> {
    stream: S,
    handler: Arc<H>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Vec<u8>),
    Closed,
}

impl<S, H> Connection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    pub fn new(stream: S, handler: Arc<H>) -> Self {
        Self {
            stream,
            handler,
            state: ConnectionState::Reading,
        }
    }

    /// Serves exactly one request, then closes the stream.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match read_request(&mut self.stream).await {
                        Ok(req) => ConnectionState::Processing(req),
                        // A broken socket will most likely fail this write too,
                        // which then surfaces as the connection error.
                        Err(e) => {
                            warn!("Rejecting request: {}", e);
                            let response = Response::bad_request(e.to_string());
                            ConnectionState::Writing(response.to_bytes()?)
                        }
                    };
                }

                ConnectionState::Processing(req) => {
                    self.state = match self.dispatch(&req)? {
                        Some(bytes) => ConnectionState::Writing(bytes),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Writing(bytes) => {
                    self.stream.write_all(&bytes).await?;
                    self.stream.flush().await?;
                }

                ConnectionState::Closed => break,
            }
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!("Shutdown after response failed: {}", e);
        }

        Ok(())
    }

    /// Runs the handler and returns the bytes to send, or `None` when the
    /// connection has to be dropped without a response.
    fn dispatch(&self, req: &Request) -> Result<Option<Vec<u8>>, WriterError> {
        let mut writer = ResponseWriter::new(Vec::new());

        match self.handler.handle(&mut writer, req) {
            Ok(()) if writer.is_complete() => Ok(Some(writer.into_inner())),
            Ok(()) => {
                warn!(
                    "Handler for {} {} left the response unfinished ({:?})",
                    req.method(),
                    req.target(),
                    writer.state()
                );
                Ok(None)
            }
            Err(e) => {
                if let Some(handler_err) = e.downcast_ref::<HandlerError>() {
                    debug!("Handler returned {}", handler_err);
                    return handler_err.to_response().to_bytes().map(Some);
                }

                if let Some(writer_err) = e.downcast_ref::<WriterError>() {
                    warn!(
                        "Aborting {} {}: {}",
                        req.method(),
                        req.target(),
                        writer_err
                    );
                    return Ok(None);
                }

                warn!("Handler for {} {} failed: {:#}", req.method(), req.target(), e);
                Response::internal_error().to_bytes().map(Some)
            }
        }
    }
}
