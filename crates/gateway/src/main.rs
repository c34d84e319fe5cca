use anyhow::anyhow;
use axum::serve;
use futures::TryFutureExt;
use log::{error, info, warn};
use metobs_gateway::{app, build_app_state, get_config_info, get_log_level, setup_logger};
use std::{net::SocketAddr, str::FromStr};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = get_config_info();
    let log_level = get_log_level(&cli);

    setup_logger()
        .level(log_level)
        .level_for("metobs_gateway", log_level)
        .level_for("http_response", log_level)
        .level_for("http_request", log_level)
        .apply()?;

    let host = cli.host();
    let port = cli.port();
    let upstream_url = cli.upstream_url();
    let api_keys = cli.api_keys();

    if api_keys.is_empty() {
        warn!("no API keys configured, every keyed request will be rejected");
    }

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", host, port))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .map_err(|e| anyhow!("error binding to socket: {}", e))
        .await?;

    info!("Metobs gateway starting...");
    info!("  Listen:   http://{}", socket_addr);
    info!("  Docs:     http://{}/scalar", socket_addr);
    info!("  Upstream: {}", upstream_url);

    let app_state = build_app_state(upstream_url, api_keys).map_err(|e| {
        error!("error building app: {}", e);
        e
    })?;

    let app = app(app_state);

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
