//! Middleware stack builder for clean composition
//!
//! This module provides a builder pattern for composing the Tower middleware stack,
//! making it easier to maintain and test the middleware pipeline.

use crate::proxy::middleware::*;
use crate::proxy::types::MaxBodySize;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use tower_http::{
    compression::CompressionLayer, decompression::RequestDecompressionLayer,
    limit::RequestBodyLimitLayer, trace::TraceLayer,
};

/// Configuration for the entire middleware stack
#[derive(Clone, Debug)]
pub struct RelayMiddlewareConfig {
    /// Ceiling for inbound bodies, both on the wire and after decompression
    pub max_body_size: MaxBodySize,
    /// Whether to enable request logging and per-request tracing spans
    pub enable_logging: bool,
    /// Whether to gzip responses for clients that accept it
    pub enable_compression: bool,
}

impl Default for RelayMiddlewareConfig {
    fn default() -> Self {
        Self {
            max_body_size: MaxBodySize::default(),
            enable_logging: true,
            enable_compression: true,
        }
    }
}

impl RelayMiddlewareConfig {
    /// Create middleware stack from configuration
    pub fn build_stack(self) -> RelayMiddlewareStack {
        RelayMiddlewareStack { config: self }
    }

    /// Builder method to change the body ceiling
    pub fn with_max_body_size(mut self, max_body_size: MaxBodySize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Builder method to disable request logging
    pub fn disable_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    /// Builder method to disable response compression
    pub fn disable_compression(mut self) -> Self {
        self.enable_compression = false;
        self
    }
}

/// Builder for composing the relay middleware stack
pub struct RelayMiddlewareStack {
    config: RelayMiddlewareConfig,
}

impl RelayMiddlewareStack {
    /// Apply the complete middleware stack to a router
    ///
    /// The middleware are applied in the following order (outer to inner):
    /// 1. Request ID generation/propagation
    /// 2. HTTP tracing span
    /// 3. Logging (with request ID)
    /// 4. Error logging
    /// 5. Response compression
    /// 6. Wire-size body limit
    /// 7. Request decompression
    /// 8. Decoded-size body limit used by the JSON extractor
    pub fn apply_to_router<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let limit = *self.config.max_body_size.as_ref();

        // Apply middleware in reverse order (innermost first in the builder)
        let mut router = router
            .layer(DefaultBodyLimit::max(limit))
            .layer(RequestDecompressionLayer::new())
            .layer(RequestBodyLimitLayer::new(limit));

        if self.config.enable_compression {
            router = router.layer(CompressionLayer::new());
        }

        router = router.layer(from_fn(error_handling_middleware));

        if self.config.enable_logging {
            router = router
                .layer(from_fn(logging_middleware))
                .layer(TraceLayer::new_for_http());
        }

        router.layer(from_fn(request_id_middleware))
    }

    /// Create a minimal stack for testing
    #[cfg(test)]
    pub fn minimal() -> Self {
        RelayMiddlewareConfig::default()
            .disable_logging()
            .disable_compression()
            .build_stack()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::headers::paths;
    use crate::proxy::types::REQUEST_ID_HEADER;
    use axum::{body::Body, http::StatusCode, response::IntoResponse};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tracing::span::{Attributes, Id};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    async fn handler() -> impl IntoResponse {
        StatusCode::OK
    }

    async fn echo(body: String) -> String {
        body
    }

    #[tokio::test]
    async fn test_middleware_stack_builder() {
        let router = Router::new()
            .route(paths::HEALTH, axum::routing::get(handler))
            .with_state(());

        let app = RelayMiddlewareConfig::default()
            .build_stack()
            .apply_to_router(router);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(paths::HEALTH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    /// Records the name of every span opened while it is the default subscriber
    #[derive(Clone, Default)]
    struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

    impl<S: tracing::Subscriber> Layer<S> for SpanNames {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            self.0.lock().push(attrs.metadata().name());
        }
    }

    async fn spans_opened_by(config: RelayMiddlewareConfig) -> Vec<&'static str> {
        let names = SpanNames::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(names.clone()),
        );

        let router = Router::new().route(paths::HEALTH, axum::routing::get(handler));
        config
            .build_stack()
            .apply_to_router(router)
            .oneshot(
                axum::http::Request::builder()
                    .uri(paths::HEALTH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let mut recorded = Vec::new();
        recorded.extend(names.0.lock().iter().copied());
        recorded
    }

    #[tokio::test]
    async fn test_logging_stack_opens_http_request_span() {
        let spans = spans_opened_by(RelayMiddlewareConfig::default()).await;
        assert!(spans.contains(&"request"));

        let quiet = spans_opened_by(RelayMiddlewareConfig::default().disable_logging()).await;
        assert!(!quiet.contains(&"request"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let router = Router::new().route("/echo", axum::routing::post(echo));
        let config = RelayMiddlewareConfig::default()
            .with_max_body_size(MaxBodySize::try_new(16).unwrap());
        let app = config.build_stack().apply_to_router(router);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from(vec![b'x'; 64]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_within_limit_passes() {
        let router = Router::new().route("/echo", axum::routing::post(echo));
        let app = RelayMiddlewareStack::minimal().apply_to_router(router);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_middleware_config_builder_methods() {
        let config = RelayMiddlewareConfig::default()
            .disable_logging()
            .disable_compression();

        assert!(!config.enable_logging);
        assert!(!config.enable_compression);
        assert_eq!(*config.max_body_size.as_ref(), 50 * 1024 * 1024);
    }
}
