//! Application state.

use std::sync::Arc;

use foundation_identity::delivery::TokenDelivery;
use foundation_identity::repository::MemoryAccountRepository;
use foundation_identity::{AuthenticationService, IdentityConfig, Result};

/// Whether purpose tokens may be echoed in HTTP responses.
///
/// Only meant for development deployments without a delivery channel.
#[must_use]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenExposure(bool);

impl TokenExposure {
    /// Tokens are only delivered out of band.
    pub const DISABLED: Self = Self(false);
    /// Registration responses also carry the confirmation token.
    pub const ENABLED: Self = Self(true);

    /// Returns whether tokens are echoed.
    #[inline]
    pub const fn is_enabled(self) -> bool {
        self.0
    }
}

impl From<bool> for TokenExposure {
    #[inline]
    fn from(enabled: bool) -> Self {
        Self(enabled)
    }
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    authentication: AuthenticationService,
    token_exposure: TokenExposure,
}

impl ServiceState {
    /// Creates the state from an already assembled service.
    pub fn new(authentication: AuthenticationService, token_exposure: TokenExposure) -> Self {
        Self {
            authentication,
            token_exposure,
        }
    }

    /// Initializes application state from configuration, keeping accounts in
    /// memory and handing purpose tokens to `delivery`.
    pub async fn from_config(
        config: &IdentityConfig,
        delivery: Arc<dyn TokenDelivery>,
    ) -> Result<Self> {
        let accounts = Arc::new(MemoryAccountRepository::new());
        let authentication = AuthenticationService::from_config(config, accounts, delivery).await?;

        Ok(Self::new(
            authentication,
            TokenExposure::from(config.expose_tokens),
        ))
    }

    /// Returns the authentication service.
    #[inline]
    pub fn authentication(&self) -> &AuthenticationService {
        &self.authentication
    }

    /// Returns whether tokens are echoed in responses.
    #[inline]
    pub fn token_exposure(&self) -> TokenExposure {
        self.token_exposure
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(authentication: AuthenticationService);
impl_di!(token_exposure: TokenExposure);
