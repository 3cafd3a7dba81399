use crate::config::Settings;
use crate::infrastructure::log_messages::application;
use crate::proxy::middleware_stack::RelayMiddlewareConfig;
use crate::proxy::{AuditProxyService, ForwardingController, ResponseCache, StaticHostSettings};
use crate::upstream::ReqwestUpstream;
use crate::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    addr: SocketAddr,
    router: Router,
}

impl Application {
    #[instrument]
    pub async fn new() -> Result<Self> {
        let settings = Settings::new()?;
        Self::from_settings(settings)
    }

    /// Wire the relay from already-loaded settings
    pub fn from_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let addr = settings.socket_addr()?;

        if !settings.audit.enabled {
            warn!("{}", application::FORWARDING_DISABLED);
        }

        let host = match settings.https_proxy()? {
            Some(proxy) => StaticHostSettings::with_proxy(proxy),
            None => StaticHostSettings::default(),
        };

        let controller = ForwardingController::new(
            settings.audit.enabled,
            Arc::new(host),
            Arc::new(ReqwestUpstream::new(settings.timeouts())),
            Arc::new(ResponseCache::new()),
        )
        .with_endpoint(settings.upstream_url()?);

        let router = AuditProxyService::new(controller)
            .with_mount_path(settings.mount_path()?)
            .with_middleware(
                RelayMiddlewareConfig::default().with_max_body_size(settings.max_body_size()?),
            )
            .into_router();

        Ok(Self {
            settings,
            addr,
            router,
        })
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(
            addr = %listener.local_addr()?,
            mount_path = %self.settings.audit.mount_path,
            "{}",
            application::LISTENING
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("{}", application::STOPPED);
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("{}", application::SHUTDOWN_SIGNAL);
}
