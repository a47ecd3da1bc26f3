//! Authenticated session extractor.
//!
//! [`AuthState`] reads `Authorization: Bearer <token>` and verifies the token
//! with the [`AuthenticationService`]. The verified claims are cached in the
//! request extensions so repeated extraction within one request verifies once.
//!
//! ```rust,ignore
//! async fn handler(AuthState(claims): AuthState) -> String {
//!     format!("signed in as {}", claims.username)
//! }
//! ```

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use derive_more::Deref;
use foundation_identity::AuthenticationService;
use foundation_identity::token::SessionClaims;

use crate::TRACING_TARGET_AUTHENTICATION as TRACING_TARGET;
use crate::handler::{Error, ErrorKind};

/// Verified session claims of the caller.
#[must_use]
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub SessionClaims);

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    AuthenticationService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let bearer = match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => bearer,
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                        .with_context("Missing Authorization header with Bearer token")
                        .with_resource("authentication"),
                    _ => ErrorKind::MalformedAuthToken
                        .with_context("Authorization header must contain a Bearer token")
                        .with_resource("authentication"),
                };
                return Err(error);
            }
        };

        let authentication = AuthenticationService::from_ref(state);
        let claims = authentication.authenticate(bearer.token()).map_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %error,
                "bearer token rejected"
            );
            ErrorKind::Unauthorized.with_resource("authentication")
        })?;

        tracing::trace!(
            target: TRACING_TARGET,
            account_id = %claims.account_id,
            "bearer token verified"
        );

        let auth_state = Self(claims);
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}
