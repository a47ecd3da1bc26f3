//! Identity core configuration.

use std::fmt;
use std::path::PathBuf;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::security::PasswordPolicy;
use crate::token::{PurposeTokenIssuer, SessionKeys, SessionTokenIssuer};
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default session lifetime (1 hour).
    pub const SESSION_TTL_SECS: u64 = 60 * 60;

    /// Default `iss` claim of session tokens.
    pub fn session_issuer() -> String {
        "foundation".to_owned()
    }

    /// Default `aud` claim of session tokens.
    pub fn session_audience() -> String {
        "foundation:api".to_owned()
    }

    /// Default email confirmation token lifetime (1 day).
    pub const EMAIL_CONFIRMATION_TTL_SECS: u64 = 24 * 60 * 60;

    /// Default password reset token lifetime (1 day).
    pub const PASSWORD_RESET_TTL_SECS: u64 = 24 * 60 * 60;

    /// Default minimum password length.
    pub const PASSWORD_MIN_LENGTH: usize = 8;

    /// Default minimum zxcvbn score.
    pub const PASSWORD_MIN_SCORE: u8 = 1;

    pub const fn session_ttl_secs() -> u64 {
        SESSION_TTL_SECS
    }

    pub const fn email_confirmation_ttl_secs() -> u64 {
        EMAIL_CONFIRMATION_TTL_SECS
    }

    pub const fn password_reset_ttl_secs() -> u64 {
        PASSWORD_RESET_TTL_SECS
    }

    pub const fn password_min_length() -> usize {
        PASSWORD_MIN_LENGTH
    }

    pub const fn password_min_score() -> u8 {
        PASSWORD_MIN_SCORE
    }
}

/// Longest accepted token lifetime (1 year).
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Secrets, lifetimes and password rules of the identity core.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct IdentityConfig {
    /// Shared secret for HS256 session tokens (at least 32 bytes).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SESSION_SECRET", hide_env_values = true)
    )]
    #[serde(default)]
    pub session_secret: Option<String>,

    /// File path to the EdDSA private key used to sign sessions.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SESSION_PRIVATE_PEM_FILEPATH", requires = "session_public_pem")
    )]
    #[serde(default)]
    pub session_private_pem: Option<PathBuf>,

    /// File path to the EdDSA public key used to verify sessions.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SESSION_PUBLIC_PEM_FILEPATH", requires = "session_private_pem")
    )]
    #[serde(default)]
    pub session_public_pem: Option<PathBuf>,

    /// Session token lifetime in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SESSION_TTL_SECS", default_value_t = defaults::SESSION_TTL_SECS)
    )]
    #[serde(default = "defaults::session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// `iss` claim of session tokens.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SESSION_ISSUER", default_value = "foundation")
    )]
    #[serde(default = "defaults::session_issuer")]
    pub session_issuer: String,

    /// `aud` claim of session tokens.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "SESSION_AUDIENCE", default_value = "foundation:api")
    )]
    #[serde(default = "defaults::session_audience")]
    pub session_audience: String,

    /// Secret keying purpose token MACs (at least 32 bytes).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "PURPOSE_TOKEN_SECRET", hide_env_values = true)
    )]
    pub purpose_token_secret: String,

    /// Email confirmation token lifetime in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "EMAIL_CONFIRMATION_TTL_SECS",
            default_value_t = defaults::EMAIL_CONFIRMATION_TTL_SECS
        )
    )]
    #[serde(default = "defaults::email_confirmation_ttl_secs")]
    pub email_confirmation_ttl_secs: u64,

    /// Password reset token lifetime in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "PASSWORD_RESET_TTL_SECS",
            default_value_t = defaults::PASSWORD_RESET_TTL_SECS
        )
    )]
    #[serde(default = "defaults::password_reset_ttl_secs")]
    pub password_reset_ttl_secs: u64,

    /// Minimum password length.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "PASSWORD_MIN_LENGTH", default_value_t = defaults::PASSWORD_MIN_LENGTH)
    )]
    #[serde(default = "defaults::password_min_length")]
    pub password_min_length: usize,

    /// Minimum zxcvbn password score (0-4).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "PASSWORD_MIN_SCORE", default_value_t = defaults::PASSWORD_MIN_SCORE)
    )]
    #[serde(default = "defaults::password_min_score")]
    pub password_min_score: u8,

    /// Echoes email confirmation tokens in API responses (development only).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "EXPOSE_TOKENS", default_value_t = false)
    )]
    #[serde(default)]
    pub expose_tokens: bool,
}

impl IdentityConfig {
    /// Creates a configuration with HS256 sessions and default settings.
    pub fn new(session_secret: impl Into<String>, purpose_token_secret: impl Into<String>) -> Self {
        Self {
            session_secret: Some(session_secret.into()),
            session_private_pem: None,
            session_public_pem: None,
            session_ttl_secs: defaults::SESSION_TTL_SECS,
            session_issuer: defaults::session_issuer(),
            session_audience: defaults::session_audience(),
            purpose_token_secret: purpose_token_secret.into(),
            email_confirmation_ttl_secs: defaults::EMAIL_CONFIRMATION_TTL_SECS,
            password_reset_ttl_secs: defaults::PASSWORD_RESET_TTL_SECS,
            password_min_length: defaults::PASSWORD_MIN_LENGTH,
            password_min_score: defaults::PASSWORD_MIN_SCORE,
            expose_tokens: false,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let uses_pem = match (&self.session_private_pem, &self.session_public_pem) {
            (Some(_), Some(_)) => true,
            (None, None) => false,
            _ => {
                return Err(Error::invalid_input(
                    "Both session PEM key paths must be set together",
                ));
            }
        };

        if !uses_pem {
            match &self.session_secret {
                None => {
                    return Err(Error::invalid_input(
                        "A session secret or a session PEM key pair is required",
                    ));
                }
                Some(secret) if secret.len() < crate::token::MIN_SECRET_LEN => {
                    return Err(Error::invalid_input(
                        "Session secret must be at least 32 bytes",
                    ));
                }
                Some(_) => {}
            }
        }

        if self.purpose_token_secret.len() < crate::token::MIN_SECRET_LEN {
            return Err(Error::invalid_input(
                "Purpose token secret must be at least 32 bytes",
            ));
        }

        for (name, ttl) in [
            ("Session", self.session_ttl_secs),
            ("Email confirmation", self.email_confirmation_ttl_secs),
            ("Password reset", self.password_reset_ttl_secs),
        ] {
            if ttl == 0 || ttl > MAX_TTL_SECS {
                return Err(Error::invalid_input(format!(
                    "{name} lifetime must be between 1 second and 1 year"
                )));
            }
        }

        if self.session_issuer.is_empty() || self.session_audience.is_empty() {
            return Err(Error::invalid_input(
                "Session issuer and audience cannot be empty",
            ));
        }

        if self.password_min_length == 0 {
            return Err(Error::invalid_input(
                "Minimum password length must be greater than 0",
            ));
        }

        if self.password_min_score > 4 {
            return Err(Error::invalid_input(
                "Minimum password score cannot exceed 4",
            ));
        }

        Ok(())
    }

    /// Returns the session token lifetime.
    #[inline]
    pub fn session_ttl(&self) -> SignedDuration {
        secs(self.session_ttl_secs)
    }

    /// Returns the email confirmation token lifetime.
    #[inline]
    pub fn email_confirmation_ttl(&self) -> SignedDuration {
        secs(self.email_confirmation_ttl_secs)
    }

    /// Returns the password reset token lifetime.
    #[inline]
    pub fn password_reset_ttl(&self) -> SignedDuration {
        secs(self.password_reset_ttl_secs)
    }

    /// Builds the password policy.
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::with_thresholds(self.password_min_length, self.password_min_score)
    }

    /// Builds the purpose token issuer.
    pub fn purpose_token_issuer(&self) -> Result<PurposeTokenIssuer> {
        PurposeTokenIssuer::new(self.purpose_token_secret.as_bytes())
    }

    /// Loads the session keys, preferring the PEM key pair when configured.
    pub async fn session_keys(&self) -> Result<SessionKeys> {
        match (
            &self.session_private_pem,
            &self.session_public_pem,
            &self.session_secret,
        ) {
            (Some(private_pem), Some(public_pem), _) => {
                SessionKeys::from_pem_files(private_pem, public_pem).await
            }
            (_, _, Some(secret)) => SessionKeys::from_secret(secret.as_bytes()),
            _ => Err(Error::invalid_input(
                "A session secret or a session PEM key pair is required",
            )),
        }
    }

    /// Builds the session token issuer.
    pub async fn session_token_issuer(&self) -> Result<SessionTokenIssuer> {
        let keys = self.session_keys().await?;
        Ok(SessionTokenIssuer::new(keys)
            .with_ttl(self.session_ttl())
            .with_issuer(&self.session_issuer, &self.session_audience))
    }
}

fn secs(value: u64) -> SignedDuration {
    SignedDuration::from_secs(i64::try_from(value).unwrap_or(i64::MAX))
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("session_secret", &self.session_secret.as_ref().map(|_| "[REDACTED]"))
            .field("session_private_pem", &self.session_private_pem)
            .field("session_public_pem", &self.session_public_pem)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("session_issuer", &self.session_issuer)
            .field("session_audience", &self.session_audience)
            .field("purpose_token_secret", &"[REDACTED]")
            .field("email_confirmation_ttl_secs", &self.email_confirmation_ttl_secs)
            .field("password_reset_ttl_secs", &self.password_reset_ttl_secs)
            .field("password_min_length", &self.password_min_length)
            .field("password_min_score", &self.password_min_score)
            .field("expose_tokens", &self.expose_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    const SESSION_SECRET: &str = "session-secret-for-tests-0123456789abcdef";
    const PURPOSE_SECRET: &str = "purpose-token-secret-for-tests-0123456789";

    #[derive(Debug, Parser)]
    struct TestCli {
        #[clap(flatten)]
        identity: IdentityConfig,
    }

    #[test]
    fn default_config_is_valid() {
        let config = IdentityConfig::new(SESSION_SECRET, PURPOSE_SECRET);
        assert!(config.validate().is_ok());
        assert_eq!(config.session_ttl(), SignedDuration::from_hours(1));
        assert_eq!(config.password_reset_ttl(), SignedDuration::from_hours(24));
    }

    #[test]
    fn short_secrets_are_rejected() {
        assert!(IdentityConfig::new("short", PURPOSE_SECRET).validate().is_err());
        assert!(IdentityConfig::new(SESSION_SECRET, "short").validate().is_err());
    }

    #[test]
    fn lone_pem_path_is_rejected() {
        let mut config = IdentityConfig::new(SESSION_SECRET, PURPOSE_SECRET);
        config.session_private_pem = Some("./private.pem".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_lifetime_is_rejected() {
        let mut config = IdentityConfig::new(SESSION_SECRET, PURPOSE_SECRET);
        config.email_confirmation_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = IdentityConfig::new(SESSION_SECRET, PURPOSE_SECRET);
        let debug = format!("{config:?}");
        assert!(!debug.contains(SESSION_SECRET));
        assert!(!debug.contains(PURPOSE_SECRET));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parses_from_command_line() {
        let cli = TestCli::parse_from([
            "test",
            "--session-secret",
            SESSION_SECRET,
            "--purpose-token-secret",
            PURPOSE_SECRET,
            "--password-min-score",
            "2",
        ]);

        assert_eq!(cli.identity.password_min_score, 2);
        assert_eq!(cli.identity.session_ttl_secs, 3600);
        assert!(!cli.identity.expose_tokens);
        assert!(cli.identity.validate().is_ok());
    }

    #[tokio::test]
    async fn builds_working_issuers() -> anyhow::Result<()> {
        let config = IdentityConfig::new(SESSION_SECRET, PURPOSE_SECRET);
        let session = config.session_token_issuer().await?;
        config.purpose_token_issuer()?;

        assert_eq!(session.ttl(), config.session_ttl());
        Ok(())
    }
}
