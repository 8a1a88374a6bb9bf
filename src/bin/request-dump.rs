//! Accepts connections and logs each parsed request instead of answering it.

use rawhttp::config::Config;
use rawhttp::http::parser::read_request;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Dumping requests sent to {}", cfg.listen_addr);

    tokio::select! {
        res = dump(listener) => res?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}

async fn dump(listener: TcpListener) -> anyhow::Result<()> {
    loop {
        let (mut socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        tokio::spawn(async move {
            match read_request(&mut socket).await {
                Ok(req) => {
                    info!(
                        method = %req.line.method,
                        target = %req.line.target,
                        version = %req.line.version,
                        body_len = req.body.len(),
                        "Request line"
                    );
                    for (name, value) in req.headers.iter() {
                        info!("  {}: {}", name, value);
                    }
                }
                Err(e) => error!("Failed to parse request from {}: {}", peer, e),
            }
            info!("Closing connection from {}", peer);
        });
    }
}
