//! HTTP header constants and well-known paths for the relay

pub use ::http::header::CONTENT_TYPE;

/// Well-known paths
pub mod paths {
    /// Full audit endpoint, relative to the mount path
    pub const AUDITS: &str = "/audits";

    /// Quick audit endpoint, relative to the mount path
    pub const AUDITS_QUICK: &str = "/audits/quick";

    /// Health check endpoint path
    pub const HEALTH: &str = "/health";
}
