//! Audit relay - forwards npm security audit requests to the public registry
//!
//! npm clients post their dependency tree to `/-/npm/v1/security/audits`
//! (or `/audits/quick`); the relay forwards it to the npm registry, retries
//! while the registry answers with server errors, and falls back once to the
//! last accepted report for an identical payload.

pub mod application;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod proxy;
pub mod upstream;

pub use application::Application;
pub use error::{Error, Result};
