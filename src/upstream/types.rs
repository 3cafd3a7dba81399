//! Type definitions for the upstream audit endpoint

use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use nutype::nutype;
use std::time::Duration;
use thiserror::Error;

/// Public npm audit endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://registry.npmjs.org/-/npm/v1/security/audits";

/// Default connect timeout applied by the transport
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Absolute URL of the upstream audit endpoint
#[nutype(
    sanitize(trim),
    validate(predicate = |s: &str| s.starts_with("http://") || s.starts_with("https://")),
    derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize, AsRef)
)]
pub struct UpstreamUrl(String);

impl Default for UpstreamUrl {
    fn default() -> Self {
        Self::try_new(DEFAULT_UPSTREAM_URL.to_string())
            .expect("DEFAULT_UPSTREAM_URL constant should be a valid URL")
    }
}

/// Outbound HTTP(S) proxy supplied by the host registry configuration
#[nutype(
    sanitize(trim),
    validate(predicate = |s: &str| s.starts_with("http://") || s.starts_with("https://")),
    derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize, AsRef)
)]
pub struct ProxyUrl(String);

/// Transport-level timeouts handed through to the HTTP client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportTimeouts {
    pub connect: Duration,
    /// Whole-request timeout; `None` leaves the call unbounded
    pub request: Option<Duration>,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            request: None,
        }
    }
}

/// A single outbound audit call.
///
/// Fields are private and [`OutboundRequest::new`] is the only constructor,
/// so every request built in this crate asks for gzip decoding and strict
/// certificate validation.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
    endpoint: UpstreamUrl,
    body: Bytes,
    proxy: Option<ProxyUrl>,
    gzip: bool,
    strict_tls: bool,
}

impl OutboundRequest {
    pub fn new(endpoint: UpstreamUrl, body: Bytes, proxy: Option<ProxyUrl>) -> Self {
        Self {
            endpoint,
            body,
            proxy,
            gzip: true,
            strict_tls: true,
        }
    }

    pub fn endpoint(&self) -> &UpstreamUrl {
        &self.endpoint
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn proxy(&self) -> Option<&ProxyUrl> {
        self.proxy.as_ref()
    }

    pub fn gzip(&self) -> bool {
        self.gzip
    }

    pub fn strict_tls(&self) -> bool {
        self.strict_tls
    }
}

/// A completed upstream exchange, whatever its status
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: HeaderValue) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Server errors are the only statuses the relay recovers from
    pub fn is_server_error(&self) -> bool {
        self.status.as_u16() >= 500
    }
}

/// The call to the upstream endpoint could not complete
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Failed to read upstream response body: {0}")]
    Body(String),

    #[error("Invalid proxy URL: {0}")]
    InvalidProxy(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Refusing to send request without certificate validation")]
    InsecureTransport,

    #[error("Request failed: {0}")]
    Request(String),
}
