//! Inbound audit requests and the replies the relay sends back

use crate::proxy::cache::CachedReport;
use crate::proxy::fingerprint::Fingerprint;
use crate::proxy::types::{ProxyResult, NPM_SESSION_HEADER};
use crate::upstream::UpstreamResponse;
use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use crate::proxy::headers::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::Value;

/// One inbound audit payload.
///
/// The payload is serialized and fingerprinted once, at construction; every
/// upstream attempt and every cache operation for this request reuses them.
#[derive(Clone, Debug)]
pub struct AuditRequest {
    headers: HeaderMap,
    body: Bytes,
    fingerprint: Fingerprint,
}

impl AuditRequest {
    pub fn new(payload: Value, headers: HeaderMap) -> ProxyResult<Self> {
        let body = Bytes::from(serde_json::to_vec(&payload)?);
        let fingerprint = Fingerprint::of_bytes(&body);
        Ok(Self {
            headers,
            body,
            fingerprint,
        })
    }

    /// Serialized payload, sent upstream verbatim
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn npm_session(&self) -> Option<&str> {
        self.headers
            .get(NPM_SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
    }
}

/// Where a reply's content came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Upstream,
    Cache,
}

/// The accepted report handed back to the caller.
///
/// Status, content type and body are the registry's own; when the registry
/// sent no content type, the reply carries none either.
#[derive(Clone, Debug)]
pub struct AuditReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
    pub source: ReplySource,
}

impl AuditReply {
    pub fn from_upstream(response: UpstreamResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            body: response.body,
            source: ReplySource::Upstream,
        }
    }

    pub fn from_cache(report: CachedReport) -> Self {
        Self {
            status: report.status,
            content_type: report.content_type,
            body: report.body,
            source: ReplySource::Cache,
        }
    }
}

impl IntoResponse for AuditReply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}
