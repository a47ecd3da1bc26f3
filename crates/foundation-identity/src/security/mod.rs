//! Credential security primitives.
//!
//! This module provides password hashing, password policy evaluation and the
//! per-account security stamp used to void outstanding purpose tokens.

mod password_hasher;
mod password_policy;
mod security_stamp;

pub use password_hasher::{Argon2PasswordHasher, PasswordHasher};
pub use password_policy::{PasswordFeedback, PasswordPolicy, PasswordStrengthResult};
pub use security_stamp::{SecurityStamp, SecurityStampAuthority};
