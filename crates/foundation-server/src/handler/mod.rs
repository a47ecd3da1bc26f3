//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use foundation_identity::IdentityConfig;
//! use foundation_identity::delivery::LogDelivery;
//! use foundation_server::handler::routes;
//! use foundation_server::service::ServiceState;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = IdentityConfig::new(
//!     "session-secret-at-least-32-bytes-long",
//!     "purpose-secret-at-least-32-bytes-long",
//! );
//! let state = ServiceState::from_config(&config, Arc::new(LogDelivery)).await?;
//! let app: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod accounts;
mod authentication;
mod error;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes and a not-found fallback.
///
/// Routes under `accounts` authenticate through the [`AuthState`] extractor.
///
/// [`AuthState`]: crate::extract::AuthState
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(authentication::routes())
        .merge(accounts::routes())
        .fallback(handler)
}
