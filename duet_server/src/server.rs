//! TCP listener loop

use crate::config::{OriginPolicy, ServerConfig};
use crate::error::SignalingError;
use crate::handler::handle_connection;
use crate::state::ServerState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// How long shutdown waits for connections to complete their close handshake
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct Server {
    listener: TcpListener,
    state: ServerState,
    policy: Arc<OriginPolicy>,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self, SignalingError> {
        let listener = TcpListener::bind(config.addr()).await?;
        Ok(Self {
            listener,
            state: ServerState::new(),
            policy: Arc::new(config.origin_policy()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SignalingError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared matchmaking state
    pub fn state(&self) -> ServerState {
        self.state.clone()
    }

    /// Accept connections forever
    pub async fn run(self) -> Result<(), SignalingError> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves, then close every peer
    /// and wait (bounded) for the connections to finish closing
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<(), SignalingError> {
        tokio::pin!(shutdown);
        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                accepted = self.listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("failed to accept connection: {e}");
                            continue;
                        }
                    };
                    debug!(%addr, "new connection");
                    let state = self.state.clone();
                    let policy = Arc::clone(&self.policy);
                    connections.spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, state, policy).await {
                            debug!(%addr, "connection failed: {e}");
                        }
                    });
                }
            }
        }

        info!(peers = self.state.peer_count(), "shutting down");
        drop(self.listener);
        self.state.close_all();
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(remaining = connections.len(), "aborting connections that did not close in time");
            connections.shutdown().await;
        }
        Ok(())
    }
}
