//! Account storage contract.
//!
//! The core never persists anything itself; it reads and writes accounts
//! through an [`AccountRepository`]. [`MemoryAccountRepository`] is the
//! in-process implementation used by tests and single-node deployments.

mod memory;

use async_trait::async_trait;

pub use self::memory::MemoryAccountRepository;
use crate::Result;
use crate::account::{Account, AccountId};

/// Durable store of account records.
///
/// Implementations keep normalized email and normalized username unique
/// across all accounts, atomically with respect to concurrent writers.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Finds an account by its identifier.
    async fn find_by_id(&self, account_id: AccountId) -> Result<Option<Account>>;

    /// Finds an account by email address, case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Finds an account by username, case-insensitively.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Conflict`](crate::ErrorKind::Conflict) when the
    /// email or username is already taken.
    async fn create(&self, account: Account) -> Result<Account>;

    /// Replaces a stored account, conditioned on its revision.
    ///
    /// The update succeeds only when the stored record still carries
    /// `account.revision`; the stored copy then gets the next revision and
    /// a fresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) for an
    /// unknown id, and [`ErrorKind::Conflict`](crate::ErrorKind::Conflict)
    /// when the record changed since it was read or the update would break
    /// a uniqueness constraint.
    async fn update(&self, account: Account) -> Result<Account>;
}
