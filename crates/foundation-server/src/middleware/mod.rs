//! Middleware for `axum::Router`.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use foundation_server::middleware::RouterExt;
//!
//! let app = axum::Router::<()>::new()
//!     .with_error_handling_layer(Duration::from_secs(30))
//!     .with_observability_layer();
//! ```

mod error_handling;
mod extensions;

pub use extensions::RouterExt;
