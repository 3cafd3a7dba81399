//! reqwest-backed upstream client

use crate::upstream::types::*;
use crate::upstream::UpstreamClient;
use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use parking_lot::Mutex;
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Upstream client over a pooled `reqwest::Client`.
///
/// The pooled client is keyed by the proxy it was built with and is only
/// rebuilt when a request arrives with a different proxy setting.
///
/// Certificates are always validated: the client is built on reqwest's
/// rustls defaults and none of its `danger_accept_invalid_*` switches are
/// touched, so a registry presenting an untrusted certificate fails with
/// [`UpstreamError::Connect`]. A request that does not ask for strict TLS is
/// refused before any client is built.
pub struct ReqwestUpstream {
    timeouts: TransportTimeouts,
    client: Mutex<Option<(Option<ProxyUrl>, reqwest::Client)>>,
}

impl ReqwestUpstream {
    pub fn new(timeouts: TransportTimeouts) -> Self {
        Self {
            timeouts,
            client: Mutex::new(None),
        }
    }

    fn client_for(&self, request: &OutboundRequest) -> Result<reqwest::Client, UpstreamError> {
        let mut slot = self.client.lock();
        if let Some((proxy, client)) = slot.as_ref() {
            if proxy.as_ref() == request.proxy() {
                return Ok(client.clone());
            }
        }

        let client = build_client(request, &self.timeouts)?;
        *slot = Some((request.proxy().cloned(), client.clone()));
        Ok(client)
    }
}

impl Default for ReqwestUpstream {
    fn default() -> Self {
        Self::new(TransportTimeouts::default())
    }
}

fn build_client(
    request: &OutboundRequest,
    timeouts: &TransportTimeouts,
) -> Result<reqwest::Client, UpstreamError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .gzip(request.gzip())
        .connect_timeout(timeouts.connect);

    if let Some(timeout) = timeouts.request {
        builder = builder.timeout(timeout);
    }

    // Only the host-configured proxy applies; ambient *_PROXY variables do not.
    builder = match request.proxy() {
        Some(proxy) => {
            debug!(proxy = %proxy, "Routing audit requests through proxy");
            let url: &str = proxy.as_ref();
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| UpstreamError::InvalidProxy(e.to_string()))?;
            builder.proxy(proxy)
        }
        None => builder.no_proxy(),
    };

    builder
        .build()
        .map_err(|e| UpstreamError::ClientBuild(e.to_string()))
}

fn classify(error: reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::Timeout
    } else if error.is_connect() {
        UpstreamError::Connect(error.to_string())
    } else if error.is_body() || error.is_decode() {
        UpstreamError::Body(error.to_string())
    } else {
        UpstreamError::Request(error.to_string())
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstream {
    async fn send(&self, request: &OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        if !request.strict_tls() {
            return Err(UpstreamError::InsecureTransport);
        }

        let client = self.client_for(request)?;
        let endpoint: &str = request.endpoint().as_ref();
        let response = client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(request.body().clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(classify)?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
