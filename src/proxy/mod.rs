//! Relay for npm security audit requests
//!
//! Audit payloads posted by npm clients are forwarded to the public registry.
//! Server errors from the registry are retried until they stop, unless a
//! previously accepted report for the same payload can stand in for one
//! failure.

pub mod audit;
pub mod cache;
pub mod controller;
pub mod error_response;
pub mod fingerprint;
pub mod headers;
pub mod host;
pub mod middleware;
pub mod middleware_stack;
pub mod service;
pub mod types;

#[cfg(test)]
mod test_utils;


pub use audit::{AuditReply, AuditRequest, ReplySource};
pub use cache::{CachedReport, ResponseCache};
pub use controller::ForwardingController;
pub use error_response::ErrorReporter;
pub use fingerprint::Fingerprint;
pub use host::{HostSettings, StaticHostSettings};
pub use service::AuditProxyService;
pub use types::{MaxBodySize, MountPath, ProxyError, ProxyResult};
