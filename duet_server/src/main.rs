//! Signaling server entry point

use clap::Parser;
use duet_server::{Server, ServerConfig, SignalingError};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

#[tokio::main]
async fn main() -> Result<(), SignalingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("duet_server=info"));

    fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .init();

    let config = ServerConfig::parse();
    let server = Server::bind(&config).await?;
    info!(addr = %server.local_addr()?, origins = ?config.origin_policy(), "signaling server listening");

    server
        .run_until(async {
            // Without a signal handler, fall back to running until killed
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
}
