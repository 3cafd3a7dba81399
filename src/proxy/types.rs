//! Type definitions for the proxy module

use crate::upstream::UpstreamError;
use nutype::nutype;
use thiserror::Error;

// ========== Size Types ==========

/// Maximum size for inbound audit payloads in bytes
#[nutype(
    derive(Clone, Copy, Debug, Display, PartialEq, Eq, Deserialize, Serialize, TryFrom, AsRef),
    validate(predicate = |size: &usize| *size > 0),
)]
pub struct MaxBodySize(usize);

impl Default for MaxBodySize {
    fn default() -> Self {
        Self::try_new(DEFAULT_MAX_BODY_BYTES).expect("50MB is valid")
    }
}

// ========== Path Types ==========

/// Path prefix the audit routes are nested under
#[nutype(
    sanitize(trim),
    validate(predicate = |s: &str| {
        s.len() > 1
            && s.starts_with('/')
            && !s.ends_with('/')
            && !s.contains(['*', '{', '}'])
    }),
    derive(Clone, Debug, Display, PartialEq, Eq, Deserialize, Serialize, TryFrom, AsRef)
)]
pub struct MountPath(String);

impl Default for MountPath {
    fn default() -> Self {
        Self::try_new(DEFAULT_MOUNT_PATH.to_string())
            .expect("DEFAULT_MOUNT_PATH constant should be a valid mount path")
    }
}

// ========== Constants ==========

/// Where npm expects the security endpoints on a registry
pub const DEFAULT_MOUNT_PATH: &str = "/-/npm/v1/security";

/// Inbound body ceiling
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header npm uses to correlate the requests of one CLI invocation
pub const NPM_SESSION_HEADER: &str = "npm-session";

/// Errors that can occur while relaying an audit request
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Audit forwarding is disabled")]
    FeatureDisabled,

    #[error("Upstream transport failure: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        assert_eq!(*MaxBodySize::default().as_ref(), 50 * 1024 * 1024);
        assert_eq!(MountPath::default().as_ref(), "/-/npm/v1/security");
    }

    #[rstest]
    #[case("/-/npm/v1/security", true)]
    #[case("/audit", true)]
    #[case("  /audit  ", true)]
    #[case("/", false)]
    #[case("", false)]
    #[case("audit", false)]
    #[case("/audit/", false)]
    #[case("/*x", false)]
    #[case("/{*rest}", false)]
    #[case("/audits/{id}", false)]
    fn test_mount_path_validation(#[case] path: &str, #[case] valid: bool) {
        assert_eq!(MountPath::try_new(path.to_string()).is_ok(), valid);
    }

    #[test]
    fn test_zero_body_size_is_rejected() {
        assert!(MaxBodySize::try_new(0).is_err());
        assert!(MaxBodySize::try_new(1).is_ok());
    }
}
