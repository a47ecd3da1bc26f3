//! Account lifecycle orchestration.
//!
//! [`AuthenticationService`] is the single entry point of the core. It
//! composes the account repository, the password hasher and policy, the
//! security stamp authority, both token issuers and the token delivery
//! collaborator.

use std::fmt;
use std::sync::Arc;

use jiff::SignedDuration;

use crate::account::{Account, NewAccount, ProfileChanges, normalize_username};
use crate::delivery::TokenDelivery;
use crate::repository::AccountRepository;
use crate::security::{
    Argon2PasswordHasher, PasswordHasher, PasswordPolicy, SecurityStampAuthority,
};
use crate::token::{PurposeTokenIssuer, SessionClaims, SessionTokenIssuer, TokenPurpose};
use crate::{Error, ErrorKind, IdentityConfig, Result, TRACING_TARGET_SERVICE as TRACING_TARGET};

/// Data supplied to [`AuthenticationService::register`].
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password: String,
    pub photo_url: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("photo_url", &self.photo_url)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registered {
    /// The newly created, unconfirmed account.
    pub account: Account,
    /// Email confirmation token, already handed to the token delivery.
    pub email_confirmation_token: String,
}

/// Orchestrates register, confirm, login, reset and profile operations.
#[derive(Clone)]
pub struct AuthenticationService {
    accounts: Arc<dyn AccountRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    password_policy: PasswordPolicy,
    security_stamps: SecurityStampAuthority,
    purpose_tokens: PurposeTokenIssuer,
    session_tokens: SessionTokenIssuer,
    delivery: Arc<dyn TokenDelivery>,
    email_confirmation_ttl: SignedDuration,
    password_reset_ttl: SignedDuration,
}

impl AuthenticationService {
    /// Creates the service from configuration and its storage and delivery
    /// collaborators, hashing passwords with default Argon2id parameters.
    pub async fn from_config(
        config: &IdentityConfig,
        accounts: Arc<dyn AccountRepository>,
        delivery: Arc<dyn TokenDelivery>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            accounts,
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
            password_policy: config.password_policy(),
            security_stamps: SecurityStampAuthority::new(),
            purpose_tokens: config.purpose_token_issuer()?,
            session_tokens: config.session_token_issuer().await?,
            delivery,
            email_confirmation_ttl: config.email_confirmation_ttl(),
            password_reset_ttl: config.password_reset_ttl(),
        })
    }

    /// Replaces the password hasher.
    pub fn with_password_hasher(mut self, password_hasher: Arc<dyn PasswordHasher>) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    /// Returns the session token issuer.
    #[inline]
    pub fn session_tokens(&self) -> &SessionTokenIssuer {
        &self.session_tokens
    }

    /// Creates an unconfirmed account and issues its email confirmation token.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInput`] for a blank username or email, or a
    ///   password rejected by the policy
    /// - [`ErrorKind::Conflict`] when the email or username is taken
    pub async fn register(&self, registration: Registration) -> Result<Registered> {
        let username = registration.username.trim();
        let email = registration.email.trim();

        if username.is_empty() || email.is_empty() {
            return Err(Error::invalid_input("Username and email are required"));
        }

        self.password_policy
            .validate(&registration.password, &[username, email])?;

        if self.accounts.find_by_email(email).await?.is_some() {
            tracing::debug!(target: TRACING_TARGET, "registration rejected: email taken");
            return Err(Error::conflict("Email is already taken"));
        }

        if self.accounts.find_by_username(username).await?.is_some() {
            tracing::debug!(target: TRACING_TARGET, "registration rejected: username taken");
            return Err(Error::conflict("Username is already taken"));
        }

        let password_hash = self.password_hasher.hash_password(&registration.password)?;
        let account = Account::new(NewAccount {
            username: username.to_owned(),
            email: email.to_owned(),
            phone_number: registration.phone_number,
            photo_url: registration.photo_url,
            password_hash,
            security_stamp: self.security_stamps.rotate(),
        });

        let account = self.accounts.create(account).await?;
        let token = self.purpose_tokens.issue(
            &account,
            TokenPurpose::EmailConfirmation,
            self.email_confirmation_ttl,
        )?;

        self.deliver(&account, TokenPurpose::EmailConfirmation, &token)
            .await;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "account registered"
        );

        Ok(Registered {
            account,
            email_confirmation_token: token,
        })
    }

    /// Marks the account's email as confirmed.
    ///
    /// Idempotent: an account that is already confirmed stays confirmed and
    /// the call succeeds.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] when no account has this email
    /// - [`ErrorKind::TokenInvalid`] for any token rejection
    pub async fn confirm_email(&self, email: &str, token: &str) -> Result<Account> {
        let mut account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::not_found("Account not found"))?;

        if account.email_confirmed {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %account.id,
                "email already confirmed"
            );

            return Ok(account);
        }

        self.purpose_tokens
            .validate(token, &account, TokenPurpose::EmailConfirmation)
            .map_err(|_| Error::token_invalid())?;

        account.email_confirmed = true;
        let account_id = account.id;

        let account = match self.accounts.update(account).await {
            Ok(account) => account,
            Err(error) if error.kind() == ErrorKind::Conflict => {
                // Lost a race; a concurrent confirmation is success too.
                match self.accounts.find_by_id(account_id).await? {
                    Some(current) if current.email_confirmed => current,
                    _ => return Err(error),
                }
            }
            Err(error) => return Err(error),
        };

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "email confirmed"
        );

        Ok(account)
    }

    /// Verifies credentials and issues a session token.
    ///
    /// An unknown email and a wrong password fail identically, with a dummy
    /// hash verification so both take comparable time. The confirmation
    /// flag is checked only after the password matched.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidCredentials`] for an unknown email or a wrong password
    /// - [`ErrorKind::EmailNotConfirmed`] when the email is not confirmed yet
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            self.password_hasher.verify_dummy_password(password);
            tracing::debug!(target: TRACING_TARGET, "login rejected: invalid credentials");
            return Err(Error::invalid_credentials());
        };

        if !self
            .password_hasher
            .verify_password(password, &account.password_hash)?
        {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %account.id,
                "login rejected: invalid credentials"
            );

            return Err(Error::invalid_credentials());
        }

        if !account.can_login() {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %account.id,
                "login rejected: email not confirmed"
            );

            return Err(Error::email_not_confirmed());
        }

        let token = self.session_tokens.issue(&account)?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "login succeeded"
        );

        Ok(token)
    }

    /// Issues and delivers a password reset token when the account exists.
    ///
    /// Never fails and returns nothing, so the caller cannot tell whether an
    /// account exists. Collaborator failures are logged.
    pub async fn forgot_password(&self, email: &str) {
        let account = match self.accounts.find_by_email(email).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::debug!(target: TRACING_TARGET, "password reset requested for unknown email");
                return;
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "password reset lookup failed"
                );
                return;
            }
        };

        match self.purpose_tokens.issue(
            &account,
            TokenPurpose::PasswordReset,
            self.password_reset_ttl,
        ) {
            Ok(token) => {
                self.deliver(&account, TokenPurpose::PasswordReset, &token)
                    .await;

                tracing::info!(
                    target: TRACING_TARGET,
                    account_id = %account.id,
                    "password reset token issued"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    account_id = %account.id,
                    error = %error,
                    "password reset token issuance failed"
                );
            }
        }
    }

    /// Replaces the password using a reset token and rotates the security stamp.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInput`] when the new password violates the
    ///   policy, or with one generic message for an unknown email or an
    ///   invalid token
    /// - [`ErrorKind::Conflict`] when the account changed concurrently
    pub async fn reset_password(&self, email: &str, token: &str, new_password: &str) -> Result<()> {
        let rejected = || Error::invalid_input("Invalid password reset request");

        let Some(mut account) = self.accounts.find_by_email(email).await? else {
            tracing::debug!(target: TRACING_TARGET, "password reset rejected: unknown email");
            return Err(rejected());
        };

        if self
            .purpose_tokens
            .validate(token, &account, TokenPurpose::PasswordReset)
            .is_err()
        {
            return Err(rejected());
        }

        // Only a valid token holder learns why a password was refused.
        self.password_policy
            .validate(new_password, &[account.email.as_str(), account.username.as_str()])?;

        let password_hash = self.password_hasher.hash_password(new_password)?;
        account.set_password_hash(password_hash, self.security_stamps.rotate());
        let account = self.accounts.update(account).await?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "password reset"
        );

        Ok(())
    }

    /// Applies profile changes to the account named by verified session claims.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInput`] for a blank username
    /// - [`ErrorKind::NotFound`] when the account no longer exists
    /// - [`ErrorKind::Conflict`] when the new username is taken
    pub async fn update_profile(
        &self,
        claims: &SessionClaims,
        changes: ProfileChanges,
    ) -> Result<Account> {
        if changes
            .username
            .as_deref()
            .is_some_and(|username| username.trim().is_empty())
        {
            return Err(Error::invalid_input("Username cannot be blank"));
        }

        let mut account = self
            .accounts
            .find_by_id(claims.account_id)
            .await?
            .ok_or_else(|| Error::not_found("Account not found"))?;

        if let Some(username) = changes.username.as_deref()
            && normalize_username(username) != account.normalized_username
            && self.accounts.find_by_username(username).await?.is_some()
        {
            return Err(Error::conflict("Username is already taken"));
        }

        if !account.apply(changes) {
            return Ok(account);
        }

        let account = self.accounts.update(account).await?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            "profile updated"
        );

        Ok(account)
    }

    /// Verifies a bearer session token.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthenticated`] for any rejection.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims> {
        self.session_tokens
            .verify(token)
            .map_err(|_| Error::unauthenticated())
    }

    async fn deliver(&self, account: &Account, purpose: TokenPurpose, token: &str) {
        if let Err(error) = self.delivery.deliver(account, purpose, token).await {
            tracing::error!(
                target: TRACING_TARGET,
                account_id = %account.id,
                purpose = %purpose,
                error = %error,
                "token delivery failed"
            );
        }
    }
}

impl fmt::Debug for AuthenticationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationService")
            .field("password_policy", &self.password_policy)
            .field("session_tokens", &self.session_tokens)
            .field("email_confirmation_ttl", &self.email_confirmation_ttl)
            .field("password_reset_ttl", &self.password_reset_ttl)
            .finish_non_exhaustive()
    }
}
