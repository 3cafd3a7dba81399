//! Application wiring
//!
//! Turns loaded settings into a running relay: the upstream client, the
//! forwarding controller and the HTTP router, served until a shutdown signal.

pub mod app;

pub use app::Application;
