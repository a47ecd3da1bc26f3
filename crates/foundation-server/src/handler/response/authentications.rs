//! Authentication response types.

use serde::{Deserialize, Serialize};

/// Response returned after a successful registration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Email confirmation token, only present when token exposure is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmation_token: Option<String>,
}

/// Response returned after a successful login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed session token, sent back as `Authorization: Bearer <token>`.
    pub token: String,
}

/// Response carrying only a message.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Creates a new [`MessageResponse`].
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
