//! Query string extractor.

use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// [`axum::extract::Query`] whose rejections name the offending parameter.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AxumQuery(query) = AxumQuery::<T>::from_request_parts(parts, state).await?;
        Ok(Self(query))
    }
}

impl From<QueryRejection> for Error<'static> {
    fn from(rejection: QueryRejection) -> Self {
        let detail = rejection.body_text();
        tracing::debug!(
            target: crate::TRACING_TARGET_HANDLER,
            error = %detail,
            "query string rejected"
        );

        let error = ErrorKind::BadRequest.with_resource("query");
        match missing_field(&detail) {
            Some(field) => error
                .with_message("Missing required query parameter")
                .with_context(format!("'{field}' is required")),
            None => error
                .with_message("Invalid query parameters")
                .with_context(sanitize_error_message(&detail)),
        }
    }
}

/// Returns the field named by a serde "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("missing field `")?;
    rest.split_once('`').map(|(field, _)| field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_named() {
        assert_eq!(
            missing_field("Failed to deserialize query string: missing field `token`"),
            Some("token")
        );
        assert_eq!(missing_field("invalid type: expected `u32`"), None);
    }
}
