use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use super::AccountRepository;
use crate::account::{Account, AccountId, normalize_email, normalize_username};
use crate::{Error, Result, TRACING_TARGET_REPOSITORY as TRACING_TARGET};

/// In-memory [`AccountRepository`].
///
/// Cloning is cheap and every clone shares the same storage. A single
/// write lock covers the uniqueness checks and the write that follows them.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountRepository {
    inner: Arc<RwLock<Accounts>>,
}

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
    by_username: HashMap<String, AccountId>,
}

impl MemoryAccountRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Returns whether the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}

impl Accounts {
    fn taken_by_other(index: &HashMap<String, AccountId>, key: &str, account_id: AccountId) -> bool {
        index.get(key).is_some_and(|owner| *owner != account_id)
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_id(&self, account_id: AccountId) -> Result<Option<Account>> {
        Ok(self.inner.read().await.by_id.get(&account_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.inner.read().await;
        let account = accounts
            .by_email
            .get(&normalize_email(email))
            .and_then(|account_id| accounts.by_id.get(account_id))
            .cloned();

        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let accounts = self.inner.read().await;
        let account = accounts
            .by_username
            .get(&normalize_username(username))
            .and_then(|account_id| accounts.by_id.get(account_id))
            .cloned();

        Ok(account)
    }

    async fn create(&self, account: Account) -> Result<Account> {
        let mut accounts = self.inner.write().await;

        if accounts.by_id.contains_key(&account.id) {
            return Err(Error::conflict("Account already exists"));
        }

        if accounts.by_email.contains_key(&account.normalized_email) {
            tracing::debug!(target: TRACING_TARGET, "create rejected: email taken");
            return Err(Error::conflict("Email is already taken"));
        }

        if accounts.by_username.contains_key(&account.normalized_username) {
            tracing::debug!(target: TRACING_TARGET, "create rejected: username taken");
            return Err(Error::conflict("Username is already taken"));
        }

        accounts
            .by_email
            .insert(account.normalized_email.clone(), account.id);
        accounts
            .by_username
            .insert(account.normalized_username.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "account created"
        );

        Ok(account)
    }

    async fn update(&self, mut account: Account) -> Result<Account> {
        let mut accounts = self.inner.write().await;

        let stored = accounts
            .by_id
            .get(&account.id)
            .ok_or_else(|| Error::not_found("Account not found"))?;

        if stored.revision != account.revision {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %account.id,
                stored_revision = stored.revision,
                revision = account.revision,
                "update rejected: stale revision"
            );

            return Err(Error::conflict("Account was modified concurrently"));
        }

        if Accounts::taken_by_other(&accounts.by_email, &account.normalized_email, account.id) {
            return Err(Error::conflict("Email is already taken"));
        }

        if Accounts::taken_by_other(&accounts.by_username, &account.normalized_username, account.id) {
            return Err(Error::conflict("Username is already taken"));
        }

        let previous_email = stored.normalized_email.clone();
        let previous_username = stored.normalized_username.clone();

        account.revision += 1;
        account.updated_at = Timestamp::now();

        accounts.by_email.remove(&previous_email);
        accounts.by_username.remove(&previous_username);
        accounts
            .by_email
            .insert(account.normalized_email.clone(), account.id);
        accounts
            .by_username
            .insert(account.normalized_username.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            account_id = %account.id,
            revision = account.revision,
            "account updated"
        );

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::account::NewAccount;
    use crate::security::SecurityStamp;

    fn account(username: &str, email: &str) -> Account {
        Account::new(NewAccount {
            username: username.to_owned(),
            email: email.to_owned(),
            phone_number: None,
            photo_url: None,
            password_hash: "$argon2id$placeholder".to_owned(),
            security_stamp: SecurityStamp::generate(),
        })
    }

    #[tokio::test]
    async fn finds_accounts_case_insensitively() -> anyhow::Result<()> {
        let repository = MemoryAccountRepository::new();
        let created = repository.create(account("Alice", "Alice@X.com")).await?;

        let by_email = repository.find_by_email("  alice@x.COM ").await?;
        let by_username = repository.find_by_username("ALICE").await?;
        let by_id = repository.find_by_id(created.id).await?;

        assert_eq!(by_email.map(|a| a.id), Some(created.id));
        assert_eq!(by_username.map(|a| a.id), Some(created.id));
        assert_eq!(by_id.map(|a| a.id), Some(created.id));
        assert!(repository.find_by_email("bob@x.com").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_duplicates() -> anyhow::Result<()> {
        let repository = MemoryAccountRepository::new();
        repository.create(account("alice", "a@x.com")).await?;

        let email_taken = repository.create(account("bob", "A@X.COM")).await;
        let username_taken = repository.create(account("Alice", "b@x.com")).await;

        assert_eq!(email_taken.map_err(|e| e.kind()).err(), Some(ErrorKind::Conflict));
        assert_eq!(username_taken.map_err(|e| e.kind()).err(), Some(ErrorKind::Conflict));
        assert_eq!(repository.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn update_bumps_revision_and_rejects_stale_copies() -> anyhow::Result<()> {
        let repository = MemoryAccountRepository::new();
        let created = repository.create(account("alice", "a@x.com")).await?;

        let mut first = created.clone();
        first.email_confirmed = true;
        let updated = repository.update(first).await?;
        assert_eq!(updated.revision, created.revision + 1);

        let mut stale = created;
        stale.phone_number = Some("555".to_owned());
        let error = repository.update(stale).await.expect_err("stale revision");
        assert_eq!(error.kind(), ErrorKind::Conflict);

        let stored = repository.find_by_id(updated.id).await?;
        assert_eq!(stored, Some(updated));

        Ok(())
    }

    #[tokio::test]
    async fn update_of_unknown_account_is_not_found() {
        let repository = MemoryAccountRepository::new();
        let error = repository
            .update(account("ghost", "ghost@x.com"))
            .await
            .expect_err("unknown account");

        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_keeps_username_index_consistent() -> anyhow::Result<()> {
        let repository = MemoryAccountRepository::new();
        let alice = repository.create(account("alice", "a@x.com")).await?;
        repository.create(account("bob", "b@x.com")).await?;

        let mut taken = alice.clone();
        taken.username = "Bob".to_owned();
        taken.normalized_username = normalize_username("Bob");
        let error = repository.update(taken).await.expect_err("username taken");
        assert_eq!(error.kind(), ErrorKind::Conflict);

        let mut renamed = alice;
        renamed.username = "carol".to_owned();
        renamed.normalized_username = normalize_username("carol");
        repository.update(renamed).await?;

        assert!(repository.find_by_username("alice").await?.is_none());
        assert!(repository.find_by_username("carol").await?.is_some());

        Ok(())
    }
}
