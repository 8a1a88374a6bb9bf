use rawhttp::config::Config;
use rawhttp::http::connection::{BufferedWriter, HandlerError};
use rawhttp::http::request::{Method, Request};
use rawhttp::http::response::{ResponseBuilder, StatusCode, default_headers};
use rawhttp::server::Server;
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
    let server = Server::serve(&cfg.listen_addr, route).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.close();

    Ok(())
}

fn route(w: &mut BufferedWriter, req: &Request) -> anyhow::Result<()> {
    match (req.method(), req.target()) {
        (_, "/bad") => {
            Err(HandlerError::new(StatusCode::BadRequest, "That request was not ok\n").into())
        }
        (_, "/fail") => Err(HandlerError::new(
            StatusCode::InternalServerError,
            "Something broke on our side\n",
        )
        .into()),
        (_, "/html") => {
            let response = ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "text/html")
                .body("<html><body><h1>Hello</h1></body></html>\n")
                .build();
            response.write_to(w)?;
            Ok(())
        }
        (Method::POST, "/echo") => {
            w.write_status_line(StatusCode::Ok)?;
            w.write_headers(&default_headers(req.body.len()))?;
            w.write_body(&req.body)?;
            Ok(())
        }
        _ => {
            let body = b"Hello from rawhttp\n";
            w.write_status_line(StatusCode::Ok)?;
            w.write_headers(&default_headers(body.len()))?;
            w.write_body(body)?;
            Ok(())
        }
    }
}
