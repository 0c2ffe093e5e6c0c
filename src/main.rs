//! Marquee Server entry point.

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use marquee_server::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = marquee_server::app_state(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        api_version = %config.api_version,
        cors = !config.cors_origins.is_empty(),
        "Marquee Server starting",
    );

    let app = marquee_server::router(state);

    let addr = SocketAddr::new(config.host.parse().expect("invalid host"), config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "Marquee Server ready");

    marquee_http::serve(listener, app, shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("Marquee Server shut down");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install signal handler");
    tracing::info!("Shutdown signal received");
}
