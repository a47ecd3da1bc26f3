//! Command-line configuration.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig      # host, port, request and shutdown timeouts
//! └── identity: IdentityConfig  # secrets, token lifetimes, password rules
//! ```
//!
//! Every option can be given as an argument or an environment variable.

mod server;

use anyhow::Context;
use clap::Parser;
use foundation_identity::IdentityConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "foundation")]
#[command(about = "Foundation account and credential service")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Secrets, token lifetimes and password rules.
    #[clap(flatten)]
    pub identity: IdentityConfig,
}

impl Cli {
    /// Loads a `.env` file (if enabled) and parses CLI arguments.
    ///
    /// The `.env` file is read first so that its variables act as defaults
    /// for clap's `env` lookups.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.identity
            .validate()
            .context("invalid identity configuration")?;
        Ok(())
    }

    /// Logs the configuration without secrets.
    pub fn log(&self) {
        self.server.log();

        let identity = &self.identity;
        let session_signing = match identity.session_private_pem {
            Some(_) => "EdDSA",
            None => "HS256",
        };

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            session_signing,
            session_ttl_secs = identity.session_ttl_secs,
            session_issuer = %identity.session_issuer,
            session_audience = %identity.session_audience,
            email_confirmation_ttl_secs = identity.email_confirmation_ttl_secs,
            password_reset_ttl_secs = identity.password_reset_ttl_secs,
            password_min_length = identity.password_min_length,
            password_min_score = identity.password_min_score,
            "identity configuration"
        );

        if identity.expose_tokens {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                "confirmation tokens are echoed in responses; do not enable in production"
            );
        }
    }
}
