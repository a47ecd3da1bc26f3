//! Purpose-bound and session tokens.
//!
//! Neither kind of token is persisted. Purpose tokens are HMAC-authenticated
//! and bound to the account's current security stamp, session tokens are
//! signed JWTs carrying identity claims.

mod purpose;
mod session;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub use self::purpose::{PurposeTokenClaims, PurposeTokenIssuer};
pub use self::session::{SessionClaims, SessionKeys, SessionTokenIssuer};

/// Minimum accepted length of a signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Result type alias for token validation.
pub type TokenResult<T> = std::result::Result<T, TokenError>;

/// Detailed token rejection reason.
///
/// Only logged. Callers outside this crate see a single collapsed error so
/// they cannot learn which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token could not be parsed.
    #[error("token is malformed")]
    Malformed,
    /// The authentication value does not match the token contents.
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// The token is past its expiry.
    #[error("token has expired")]
    Expired,
    /// The token was issued for a different purpose.
    #[error("token was issued for a different purpose")]
    PurposeMismatch,
}

/// Operation a purpose token authorizes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TokenPurpose {
    /// Confirms ownership of the registered email address.
    EmailConfirmation,
    /// Authorizes replacing a forgotten password.
    PasswordReset,
}

impl TokenPurpose {
    /// Returns the single-byte tag encoded into tokens.
    #[inline]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::EmailConfirmation => 1,
            Self::PasswordReset => 2,
        }
    }

    /// Parses the single-byte tag encoded into tokens.
    #[inline]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::EmailConfirmation),
            2 => Some(Self::PasswordReset),
            _ => None,
        }
    }
}
