//! Audit relay service
//!
//! The `AuditProxyService` wires the forwarding controller to HTTP. It is
//! constructed explicitly from its collaborators and turned into an axum
//! router; nothing is registered globally.
//!
//! ```rust,ignore
//! use audit_relay::proxy::{AuditProxyService, ForwardingController, ResponseCache, StaticHostSettings};
//! use audit_relay::upstream::ReqwestUpstream;
//!
//! let controller = ForwardingController::new(
//!     true,
//!     Arc::new(StaticHostSettings::default()),
//!     Arc::new(ReqwestUpstream::default()),
//!     Arc::new(ResponseCache::new()),
//! );
//! let router = AuditProxyService::new(controller).into_router();
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```
//!
//! Routes, relative to the mount path (default `/-/npm/v1/security`):
//!
//! - `POST /audits`
//! - `POST /audits/quick` (same handling)
//!
//! plus `GET /health` at the root.

use crate::infrastructure::log_messages::request_processing;
use crate::proxy::audit::AuditRequest;
use crate::proxy::controller::ForwardingController;
use crate::proxy::error_response::{extract_request_id, generic_error_response, ErrorReporter};
use crate::proxy::headers::paths;
use crate::proxy::middleware_stack::RelayMiddlewareConfig;
use crate::proxy::types::{MountPath, ProxyError};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// HTTP front of the relay
pub struct AuditProxyService {
    controller: ForwardingController,
    error_reporter: Option<Arc<dyn ErrorReporter>>,
    mount_path: MountPath,
    middleware: RelayMiddlewareConfig,
}

impl AuditProxyService {
    /// Create a new relay service around `controller`
    pub fn new(controller: ForwardingController) -> Self {
        Self {
            controller,
            error_reporter: None,
            mount_path: MountPath::default(),
            middleware: RelayMiddlewareConfig::default(),
        }
    }

    /// Let the host render transport failures
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = Some(reporter);
        self
    }

    pub fn with_mount_path(mut self, mount_path: MountPath) -> Self {
        self.mount_path = mount_path;
        self
    }

    pub fn with_middleware(mut self, middleware: RelayMiddlewareConfig) -> Self {
        self.middleware = middleware;
        self
    }

    pub fn controller(&self) -> &ForwardingController {
        &self.controller
    }

    /// Run one audit request through the controller and write the response
    pub async fn relay(&self, request: AuditRequest, request_id: Option<&str>) -> Response {
        match self.controller.handle(request).await {
            Ok(reply) => reply.into_response(),
            Err(err @ ProxyError::Upstream(_)) => match &self.error_reporter {
                Some(reporter) => reporter.report(&err, request_id),
                None => generic_error_response(&err, request_id),
            },
            Err(err) => generic_error_response(&err, request_id),
        }
    }

    /// Create an Axum router for the relay with middleware
    pub fn into_router(self) -> Router {
        let mount_path = self.mount_path.clone();
        let middleware = self.middleware.clone();

        let audits = Router::new()
            .route(paths::AUDITS, post(audit_handler))
            .route(paths::AUDITS_QUICK, post(audit_handler));

        let router = Router::new()
            .nest(mount_path.as_ref(), audits)
            .route(paths::HEALTH, get(health_handler))
            .with_state(Arc::new(self));

        middleware.build_stack().apply_to_router(router)
    }
}

/// Axum handler shared by both audit routes
async fn audit_handler(
    State(service): State<Arc<AuditProxyService>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let request_id = extract_request_id(&headers);

    let request = match AuditRequest::new(payload, headers) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "{}", request_processing::INVALID_PAYLOAD);
            return generic_error_response(&err, request_id.as_deref());
        }
    };

    service.relay(request, request_id.as_deref()).await
}

/// Health check handler
async fn health_handler() -> &'static str {
    "OK"
}
