//! Gateway startup and shutdown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use passlink_capabilities::{InMemoryViewGate, ViewGate};
use passlink_credentials::{CredentialStore, InMemoryCredentialStore, JsonFileCredentialStore};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{GatewayConfig, StoreBackend};
use crate::error::{GatewayError, GatewayResult};
use crate::http::{AppState, build_router};

/// Build the shared state for `config`.
#[must_use]
pub fn build_state(config: &GatewayConfig) -> Arc<AppState> {
    let credentials: Arc<dyn CredentialStore> = match config.store.backend {
        StoreBackend::Json => Arc::new(JsonFileCredentialStore::new(config.store.path.clone())),
        StoreBackend::Memory => Arc::new(InMemoryCredentialStore::new()),
    };
    Arc::new(AppState::new(Arc::new(InMemoryViewGate::new()), credentials))
}

/// Periodically evict gate counters idle for at least `retention`.
pub fn spawn_sweeper(
    gate: Arc<dyn ViewGate>,
    retention: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = gate.sweep_idle(retention).await {
                tracing::warn!(error = %e, "View counter sweep failed");
            }
        }
    })
}

/// Serve `state` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an IO error if the server fails.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> GatewayResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Run the gateway described by `config` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the listener cannot
/// bind, or the server fails.
pub async fn serve(config: &GatewayConfig) -> GatewayResult<()> {
    config.validate()?;
    let addr = config.server.socket_addr()?;
    let state = build_state(config);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| GatewayError::Bind { addr, source })?;
    tracing::info!(
        addr = %listener.local_addr()?,
        backend = ?config.store.backend,
        "Gateway listening"
    );

    let sweeper = config.gate.retention().map(|retention| {
        spawn_sweeper(
            Arc::clone(state.service.gate()),
            retention,
            config.gate.sweep_interval(),
        )
    });

    let result = run(listener, state, shutdown_signal()).await;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("Gateway stopped");
    result
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
