use std::net::SocketAddr;

use anyhow::Result;
use civicboard::application::config::Configuration;
use civicboard::application::Application;
use civicboard::webserver;
use clap::Parser;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let configuration = Configuration::parse();
    let _log_guard = Application::install_logging(&configuration)?;
    let host = configuration.host.to_owned();
    let port = configuration.port;
    info!(%host, port, "civicboard webserver starting");

    let application = Application::initialize(configuration).await?;
    start(application, host, port).await
}

async fn start(application: Application, host: String, port: u16) -> Result<()> {
    let address: SocketAddr = format!("{}:{}", host, port).parse()?;
    let router = webserver::router(application);
    info!(%address, "ready to serve requests");

    axum::Server::bind(&address)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
        info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
