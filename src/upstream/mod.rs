//! Outbound client for the public npm audit endpoint
//!
//! The client performs exactly one POST per call and never retries; retry
//! policy belongs to the forwarding controller. Transport failures and HTTP
//! statuses come back separately so the caller can tell "the registry said no"
//! from "we never reached the registry".

pub mod reqwest_client;
pub mod types;

use async_trait::async_trait;

pub use reqwest_client::ReqwestUpstream;
pub use types::{
    OutboundRequest, ProxyUrl, TransportTimeouts, UpstreamError, UpstreamResponse, UpstreamUrl,
    DEFAULT_UPSTREAM_URL,
};

/// A single-shot HTTP boundary to the upstream audit API
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Send one request; `Err` means the exchange itself did not complete
    async fn send(&self, request: &OutboundRequest) -> Result<UpstreamResponse, UpstreamError>;
}
