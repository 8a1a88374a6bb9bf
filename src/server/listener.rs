use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::http::connection::{Connection, Handler};

/// A running HTTP server.
///
/// The accept loop runs on its own task and spawns one task per accepted
/// connection. [`Server::close`] stops accepting; connections already being
/// served run to completion.
pub struct Server {
    local_addr: SocketAddr,
    closed: AtomicBool,
    shutdown: Notify,
}

impl Server {
    /// Binds `addr` and starts accepting connections in the background.
    pub async fn serve<H: Handler>(addr: &str, handler: H) -> anyhow::Result<Arc<Self>> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let server = Arc::new(Self {
            local_addr,
            closed: AtomicBool::new(false),
            shutdown: Notify::new(),
        });

        tokio::spawn(Arc::clone(&server).accept_loop(listener, Arc::new(handler)));

        Ok(server)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops the accept loop and releases the listener. Does not wait for
    /// in-flight connections.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.shutdown.notify_one();
    }

    async fn accept_loop<H: Handler>(self: Arc<Self>, listener: TcpListener, handler: Arc<H>) {
        loop {
            let accepted = tokio::select! {
                res = listener.accept() => res,
                _ = self.shutdown.notified() => {
                    debug!("Accept loop on {} stopped", self.local_addr);
                    return;
                }
            };

            let (socket, peer) = match accepted {
                Ok(conn) => conn,
                Err(_) if self.is_closed() => return,
                Err(e) => {
                    error!("Accept failed on {}: {}", self.local_addr, e);
                    continue;
                }
            };

            info!("Accepted connection from {}", peer);

            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, handler);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }
}
