//! Infrastructure concerns shared across the relay

pub mod log_messages;
pub mod logging;
