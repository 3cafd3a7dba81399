//! Test utilities for proxy module testing
//!
//! This module provides a scripted upstream client and helpers to build
//! controllers and services around it without touching the network.

#[cfg(test)]
pub mod test_helpers {
    use crate::proxy::{
        AuditProxyService, AuditRequest, ForwardingController, ResponseCache, StaticHostSettings,
    };
    use crate::upstream::{OutboundRequest, UpstreamClient, UpstreamError, UpstreamResponse};
    use async_trait::async_trait;
    use http::{HeaderMap, StatusCode};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub type Scripted = Result<UpstreamResponse, UpstreamError>;

    /// Replays scripted outcomes in order, then repeats `fallback` forever
    pub struct ScriptedUpstream {
        script: Mutex<VecDeque<Scripted>>,
        fallback: Scripted,
        seen: Mutex<Vec<OutboundRequest>>,
        calls: AtomicUsize,
    }

    impl ScriptedUpstream {
        pub fn new(script: Vec<Scripted>, fallback: Scripted) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                seen: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn always(outcome: Scripted) -> Arc<Self> {
            Self::new(Vec::new(), outcome)
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn seen(&self) -> Vec<OutboundRequest> {
            self.seen.lock().clone()
        }
    }

    #[async_trait]
    impl UpstreamClient for ScriptedUpstream {
        async fn send(&self, request: &OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push(request.clone());
            let next = self.script.lock().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    pub fn ok(body: &'static str) -> Scripted {
        Ok(UpstreamResponse::new(StatusCode::OK, body))
    }

    pub fn server_error() -> Scripted {
        Ok(UpstreamResponse::new(
            StatusCode::BAD_GATEWAY,
            "<html>bad gateway</html>",
        ))
    }

    /// An enabled controller with no proxy and an empty cache
    pub fn controller(upstream: Arc<ScriptedUpstream>) -> ForwardingController {
        ForwardingController::new(
            true,
            Arc::new(StaticHostSettings::default()),
            upstream,
            Arc::new(ResponseCache::new()),
        )
    }

    /// An enabled relay service with the default mount path and middleware
    pub fn service(upstream: Arc<ScriptedUpstream>) -> AuditProxyService {
        AuditProxyService::new(controller(upstream))
    }

    pub fn audit(payload: serde_json::Value) -> AuditRequest {
        AuditRequest::new(payload, HeaderMap::new()).expect("JSON values always serialize")
    }
}
