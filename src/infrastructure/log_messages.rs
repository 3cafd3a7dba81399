//! Log message constants for the relay
//!
//! This module centralizes log messages so operators can grep for them and
//! tests can refer to them without duplicating string literals.

/// Application startup and lifecycle messages
pub mod application {
    pub const STARTING: &str = "Starting audit relay";
    pub const LISTENING: &str = "Audit relay listening";
    pub const SHUTDOWN_SIGNAL: &str = "Shutdown signal received, draining connections";
    pub const STOPPED: &str = "Audit relay stopped";
    pub const FORWARDING_DISABLED: &str =
        "Audit forwarding is disabled; audit routes will answer with 500";
}

/// Forwarding controller messages
pub mod forwarding {
    pub const DISABLED: &str = "Rejecting audit request: forwarding disabled";
    pub const FORWARDING: &str = "Forwarding audit request to registry";
    pub const UPSTREAM_SERVER_ERROR: &str = "Request to registry failed";
    pub const SERVING_FROM_CACHE: &str = "Fetching from cache";
    pub const RETRYING: &str = "Retrying request to registry";
    pub const TRANSPORT_FAILURE: &str = "Could not reach registry";
    pub const ACCEPTED: &str = "Registry accepted audit request";
}

/// Request/response processing messages
pub mod request_processing {
    pub const INCOMING: &str = "Incoming request";
    pub const COMPLETED: &str = "Request completed";
    pub const FAILED: &str = "Request failed";
    pub const INVALID_PAYLOAD: &str = "Audit payload could not be serialized";
}
