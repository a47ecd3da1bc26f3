//! Out-of-band delivery of purpose tokens.
//!
//! Confirmation and reset tokens reach the account owner through a
//! [`TokenDelivery`] (email, SMS, ...), never through the response of the
//! request that triggered them.

#[cfg(any(test, feature = "outbox"))]
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(any(test, feature = "outbox"))]
use tokio::sync::Mutex;

use crate::account::Account;
#[cfg(any(test, feature = "outbox"))]
use crate::account::AccountId;
use crate::token::TokenPurpose;
use crate::{Result, TRACING_TARGET_DELIVERY as TRACING_TARGET};

/// Delivers a freshly issued purpose token to the account owner.
#[async_trait]
pub trait TokenDelivery: Send + Sync {
    /// Sends `token` for `purpose` to the contact address of `account`.
    async fn deliver(&self, account: &Account, purpose: TokenPurpose, token: &str) -> Result<()>;
}

/// [`TokenDelivery`] that only logs delivery metadata.
///
/// The token itself is dropped, so nothing accumulates in memory. Stands in
/// for a real channel until one is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

#[async_trait]
impl TokenDelivery for LogDelivery {
    async fn deliver(&self, account: &Account, purpose: TokenPurpose, _token: &str) -> Result<()> {
        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            purpose = %purpose,
            "token issued without a delivery channel"
        );

        Ok(())
    }
}

/// A delivery recorded by the [`Outbox`].
#[cfg(any(test, feature = "outbox"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub account_id: AccountId,
    pub email: String,
    pub purpose: TokenPurpose,
    pub token: String,
}

/// In-memory [`TokenDelivery`] that records every delivery.
///
/// Keeps plaintext tokens without bound, so it is only compiled for tests
/// and behind the `outbox` feature. Clones share the same records.
#[cfg(any(test, feature = "outbox"))]
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

#[cfg(any(test, feature = "outbox"))]
impl Outbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded delivery, oldest first.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }

    /// Returns the most recent token delivered to `email` for `purpose`.
    pub async fn latest_token(&self, email: &str, purpose: TokenPurpose) -> Option<String> {
        self.deliveries
            .lock()
            .await
            .iter()
            .rev()
            .find(|delivery| delivery.purpose == purpose && delivery.email.eq_ignore_ascii_case(email))
            .map(|delivery| delivery.token.clone())
    }
}

#[cfg(any(test, feature = "outbox"))]
#[async_trait]
impl TokenDelivery for Outbox {
    async fn deliver(&self, account: &Account, purpose: TokenPurpose, token: &str) -> Result<()> {
        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            purpose = %purpose,
            "token queued for delivery"
        );

        self.deliveries.lock().await.push(Delivery {
            account_id: account.id,
            email: account.email.clone(),
            purpose,
            token: token.to_owned(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::security::SecurityStamp;

    fn account() -> Account {
        Account::new(NewAccount {
            username: "alice".to_owned(),
            email: "a@x.com".to_owned(),
            phone_number: None,
            photo_url: None,
            password_hash: "$argon2id$placeholder".to_owned(),
            security_stamp: SecurityStamp::generate(),
        })
    }

    #[test]
    fn log_delivery_has_no_storage() {
        assert_eq!(std::mem::size_of::<LogDelivery>(), 0);
    }

    #[tokio::test]
    async fn log_delivery_accepts_repeated_tokens() -> anyhow::Result<()> {
        let account = account();
        for _ in 0..1_000 {
            LogDelivery
                .deliver(&account, TokenPurpose::PasswordReset, "token")
                .await?;
        }

        Ok(())
    }

    #[tokio::test]
    async fn outbox_returns_latest_token_per_purpose() -> anyhow::Result<()> {
        let outbox = Outbox::new();
        let account = account();

        outbox
            .deliver(&account, TokenPurpose::EmailConfirmation, "first")
            .await?;
        outbox
            .deliver(&account, TokenPurpose::PasswordReset, "second")
            .await?;
        outbox
            .deliver(&account, TokenPurpose::EmailConfirmation, "third")
            .await?;

        assert_eq!(outbox.deliveries().await.len(), 3);
        assert_eq!(
            outbox
                .latest_token("A@X.com", TokenPurpose::EmailConfirmation)
                .await
                .as_deref(),
            Some("third")
        );
        Ok(())
    }
}
