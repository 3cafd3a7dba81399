//! Forwarding controller: one logical audit request, start to finish
//!
//! ```text
//! Start -> CallingUpstream -> Success                      (status < 500, cached)
//!                          -> ServerErrorCacheHit          (status >= 500, cache entry consumed)
//!                          -> ServerErrorRetry -> CallingUpstream
//!                          -> TransportError               (surfaced, never retried)
//! ```
//!
//! Retries on server errors have no backoff, no cap and no timeout. The loop
//! only ends when the registry answers below 500, a cached report covers the
//! failure, the transport fails, or the caller goes away and the future is
//! dropped.

use crate::infrastructure::log_messages::forwarding;
use crate::proxy::audit::{AuditReply, AuditRequest};
use crate::proxy::cache::{CachedReport, ResponseCache};
use crate::proxy::host::HostSettings;
use crate::proxy::types::{ProxyError, ProxyResult};
use crate::upstream::{OutboundRequest, UpstreamClient, UpstreamError, UpstreamResponse, UpstreamUrl};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Per-attempt classification of an upstream call
#[derive(Debug)]
enum AttemptOutcome {
    Accepted(UpstreamResponse),
    ServerError(UpstreamResponse),
    TransportError(UpstreamError),
}

impl From<Result<UpstreamResponse, UpstreamError>> for AttemptOutcome {
    fn from(result: Result<UpstreamResponse, UpstreamError>) -> Self {
        match result {
            Ok(response) if response.is_server_error() => Self::ServerError(response),
            Ok(response) => Self::Accepted(response),
            Err(error) => Self::TransportError(error),
        }
    }
}

/// Orchestrates fingerprinting, upstream calls, retries and cache fallback
pub struct ForwardingController {
    enabled: bool,
    endpoint: UpstreamUrl,
    host: Arc<dyn HostSettings>,
    upstream: Arc<dyn UpstreamClient>,
    cache: Arc<ResponseCache>,
}

impl ForwardingController {
    pub fn new(
        enabled: bool,
        host: Arc<dyn HostSettings>,
        upstream: Arc<dyn UpstreamClient>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            enabled,
            endpoint: UpstreamUrl::default(),
            host,
            upstream,
            cache,
        }
    }

    /// Point the controller at a different audit endpoint
    pub fn with_endpoint(mut self, endpoint: UpstreamUrl) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn endpoint(&self) -> &UpstreamUrl {
        &self.endpoint
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Relay one audit request
    #[instrument(
        skip(self, request),
        fields(fingerprint = %request.fingerprint(), npm_session = request.npm_session())
    )]
    pub async fn handle(&self, request: AuditRequest) -> ProxyResult<AuditReply> {
        if !self.enabled {
            debug!("{}", forwarding::DISABLED);
            return Err(ProxyError::FeatureDisabled);
        }

        let fingerprint = request.fingerprint();
        let mut attempt: u64 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            debug!(attempt, endpoint = %self.endpoint, "{}", forwarding::FORWARDING);

            let outbound = OutboundRequest::new(
                self.endpoint.clone(),
                request.body().clone(),
                self.host.https_proxy(),
            );

            match AttemptOutcome::from(self.upstream.send(&outbound).await) {
                AttemptOutcome::Accepted(response) => {
                    info!(
                        attempt,
                        status = response.status.as_u16(),
                        "{}",
                        forwarding::ACCEPTED
                    );
                    self.cache
                        .put(fingerprint.clone(), CachedReport::from(&response));
                    return Ok(AuditReply::from_upstream(response));
                }
                AttemptOutcome::ServerError(response) => {
                    warn!(
                        attempt,
                        status = response.status.as_u16(),
                        "{} {}",
                        forwarding::UPSTREAM_SERVER_ERROR,
                        response.status.as_u16()
                    );

                    if let Some(cached) = self.cache.take_if_present(fingerprint) {
                        info!(attempt, "{}", forwarding::SERVING_FROM_CACHE);
                        return Ok(AuditReply::from_cache(cached));
                    }

                    warn!(attempt, "{}", forwarding::RETRYING);
                    // Keep a registry that fails instantly from starving other tasks.
                    tokio::task::yield_now().await;
                }
                AttemptOutcome::TransportError(err) => {
                    error!(attempt, error = %err, "{}", forwarding::TRANSPORT_FAILURE);
                    return Err(ProxyError::Upstream(err));
                }
            }
        }
    }
}
