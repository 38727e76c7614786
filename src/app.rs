use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use tokio::{net::TcpListener, time::timeout};

use crate::{
    config::AppConfig,
    http::{self, AppState},
    infrastructure::{directories::ResolvedPaths, instance_guard::InstanceGuard, shutdown::Shutdown},
    store::Stores,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ServerApp {
    _guard: Option<InstanceGuard>,
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    shutdown: Shutdown,
}

impl ServerApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let guard = if config.skip_instance_guard {
            tracing::warn!(
                target: "lifecycle",
                "instance guard skipped because SKIP_INSTANCE_GUARD is set"
            );
            None
        } else {
            Some(InstanceGuard::acquire(&paths)?)
        };

        let stores = Stores::open(&paths);
        tracing::info!(
            target: "store",
            bad_urls = stores.bad_urls.len(),
            members = stores.members.len(),
            bad_urls_path = %stores.bad_urls.path().display(),
            members_path = %stores.members.path().display(),
            "stores opened"
        );

        let state = Arc::new(AppState::new(stores));
        let router = http::router(state, config.server.max_body_bytes);

        let address = config.server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            _guard: guard,
            listener,
            local_addr,
            router,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let ServerApp {
            _guard,
            listener,
            local_addr,
            router,
            shutdown,
        } = self;

        tracing::info!(target: "lifecycle", "anti-spam server listening on http://{local_addr}");

        let mut graceful = shutdown.subscribe();
        let mut server = Box::pin(
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { graceful.notified().await })
                .into_future(),
        );

        let mut shutdown_listener = shutdown.subscribe();
        tokio::select! {
            res = &mut server => {
                res.context("http server stopped unexpectedly")?;
                return Ok(());
            }
            _ = shutdown_listener.notified() => {
                tracing::info!(target: "lifecycle", "shutdown signal received (CTRL+C / SIGTERM)");
            }
        }

        match timeout(SHUTDOWN_TIMEOUT, &mut server).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(target: "lifecycle", error = %err, "http server failed while draining");
            }
            Err(_) => {
                tracing::warn!(
                    target: "lifecycle",
                    "open connections did not drain within {:?}; forcing exit",
                    SHUTDOWN_TIMEOUT
                );
            }
        }

        tracing::info!(target: "lifecycle", "server stopped");
        Ok(())
    }
}
