#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for account lifecycle operations (register, login, reset, ...).
pub const TRACING_TARGET_SERVICE: &str = "foundation_identity::service";

/// Tracing target for account storage operations.
pub const TRACING_TARGET_REPOSITORY: &str = "foundation_identity::repository";

/// Tracing target for password hashing and verification.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "foundation_identity::password_hasher";

/// Tracing target for password policy evaluation.
pub const TRACING_TARGET_PASSWORD_POLICY: &str = "foundation_identity::password_policy";

/// Tracing target for purpose-bound token issuance and validation.
pub const TRACING_TARGET_PURPOSE_TOKEN: &str = "foundation_identity::purpose_token";

/// Tracing target for session token signing and verification.
pub const TRACING_TARGET_SESSION_TOKEN: &str = "foundation_identity::session_token";

/// Tracing target for out-of-band token delivery.
pub const TRACING_TARGET_DELIVERY: &str = "foundation_identity::delivery";

mod error;

pub mod account;
pub mod config;
pub mod delivery;
pub mod repository;
pub mod security;
pub mod service;
pub mod token;

pub use crate::account::{Account, AccountId, NewAccount, ProfileChanges};
pub use crate::config::IdentityConfig;
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::service::{AuthenticationService, Registered, Registration};
