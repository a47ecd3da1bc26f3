//! Request extractors that reject with [`Error`] responses.
//!
//! - [`Json`] and [`ValidateJson`] deserialize (and validate) request bodies
//! - [`Query`] deserializes query strings
//! - [`AuthState`] verifies the bearer session token
//!
//! [`Error`]: crate::handler::Error

mod auth;
mod reject;

pub use crate::extract::auth::AuthState;
pub use crate::extract::reject::{Json, Query, ValidateJson};
