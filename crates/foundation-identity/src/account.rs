//! Account model.
//!
//! ## Models
//!
//! - [`Account`] - A registered identity together with its security state
//! - [`NewAccount`] - Data required to create an account
//! - [`ProfileChanges`] - Explicit partial update of the mutable profile fields

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::SecurityStamp;

/// Opaque, immutable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[derive(derive_more::Display, derive_more::From, derive_more::Into)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generates a new time-ordered identifier.
    #[inline]
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique account identifier, assigned at creation.
    pub id: AccountId,
    /// Display username as supplied by the user.
    pub username: String,
    /// Case-insensitive form of `username`, unique across accounts.
    pub normalized_username: String,
    /// Email address as supplied by the user.
    pub email: String,
    /// Case-insensitive form of `email`, unique across accounts.
    pub normalized_email: String,
    /// Whether the email address has been confirmed.
    pub email_confirmed: bool,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional URL to a profile photo.
    pub photo_url: Option<String>,
    /// PHC-format password hash, never empty.
    pub password_hash: String,
    /// Rotates on every password change, voiding outstanding purpose tokens.
    pub security_stamp: SecurityStamp,
    /// Optimistic concurrency revision, bumped by every successful update.
    pub revision: u64,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
    /// Timestamp when the account was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub photo_url: Option<String>,
    pub password_hash: String,
    pub security_stamp: SecurityStamp,
}

/// Partial update of the profile fields.
///
/// `None` leaves the field untouched, `Some` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub photo_url: Option<String>,
}

impl Account {
    /// Builds a fresh, unconfirmed account from creation data.
    pub fn new(new_account: NewAccount) -> Self {
        let now = Timestamp::now();
        let username = new_account.username.trim().to_owned();
        let email = new_account.email.trim().to_owned();

        Self {
            id: AccountId::new_v7(),
            normalized_username: normalize_username(&username),
            normalized_email: normalize_email(&email),
            username,
            email,
            email_confirmed: false,
            phone_number: new_account.phone_number,
            photo_url: new_account.photo_url,
            password_hash: new_account.password_hash,
            security_stamp: new_account.security_stamp,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether the account can sign in.
    #[inline]
    pub fn can_login(&self) -> bool {
        self.email_confirmed
    }

    /// Replaces the password hash and its security stamp together.
    pub fn set_password_hash(&mut self, password_hash: String, security_stamp: SecurityStamp) {
        self.password_hash = password_hash;
        self.security_stamp = security_stamp;
    }

    /// Applies profile changes, returning whether anything was modified.
    pub fn apply(&mut self, changes: ProfileChanges) -> bool {
        let mut changed = false;

        if let Some(username) = changes.username {
            let username = username.trim().to_owned();
            if username != self.username {
                self.normalized_username = normalize_username(&username);
                self.username = username;
                changed = true;
            }
        }

        if let Some(phone_number) = changes.phone_number
            && self.phone_number.as_deref() != Some(phone_number.as_str())
        {
            self.phone_number = Some(phone_number);
            changed = true;
        }

        if let Some(photo_url) = changes.photo_url
            && self.photo_url.as_deref() != Some(photo_url.as_str())
        {
            self.photo_url = Some(photo_url);
            changed = true;
        }

        changed
    }
}

impl ProfileChanges {
    /// Returns whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.phone_number.is_none() && self.photo_url.is_none()
    }
}

/// Normalizes an email address for lookups and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes a username for lookups and uniqueness checks.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
