#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for request handlers.
pub const TRACING_TARGET_HANDLER: &str = "foundation_server::handler";

/// Tracing target for bearer token authentication.
pub const TRACING_TARGET_AUTHENTICATION: &str = "foundation_server::authentication";

/// Tracing target for middleware errors and panics.
pub const TRACING_TARGET_MIDDLEWARE: &str = "foundation_server::middleware";

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;
