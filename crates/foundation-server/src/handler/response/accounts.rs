//! Account response types.

use foundation_identity::Account as AccountModel;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of an account.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique identifier of the account.
    pub account_id: Uuid,
    /// Display username.
    pub username: String,
    /// Email address associated with the account.
    pub email: String,
    /// Whether the email address has been confirmed.
    pub email_confirmed: bool,
    /// Phone number (optional).
    pub phone_number: Option<String>,
    /// Profile photo URL (optional).
    pub photo_url: Option<String>,

    /// Timestamp when the account was created.
    pub created_at: Timestamp,
    /// Timestamp when the account was last updated.
    pub updated_at: Timestamp,
}

impl Account {
    pub fn from_model(account: AccountModel) -> Self {
        Self {
            account_id: account.id.into(),
            username: account.username,
            email: account.email,
            email_confirmed: account.email_confirmed,
            phone_number: account.phone_number,
            photo_url: account.photo_url,

            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
