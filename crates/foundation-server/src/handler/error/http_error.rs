//! HTTP error type returned by every handler and extractor.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Handler error.
///
/// The [`ErrorKind`] fixes the status code and the default body; the
/// optional parts override the body's message and add a resource or context.
#[derive(Debug, Clone, Default)]
#[must_use = "errors do nothing unless turned into a response"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates an error that renders the default body of `kind`.
    #[inline]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
            context: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Replaces the client-facing message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the resource the error is about.
    #[inline]
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Adds detail such as the fields that failed validation.
    #[inline]
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Builds the JSON body sent to the client.
    pub fn to_response(&self) -> ErrorResponse<'_> {
        let mut response: ErrorResponse<'_> = self.kind.response();

        if let Some(message) = self.message.as_deref() {
            response = response.with_message(message);
        }
        if let Some(resource) = self.resource.as_deref() {
            response = response.with_resource(resource);
        }
        if let Some(context) = self.context.as_deref() {
            response = response.with_context(context);
        }

        response
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.to_response();
        write!(f, "{} ({}): {}", response.name, response.status, response.message)?;

        match (response.resource, response.context) {
            (Some(resource), Some(context)) => write!(f, " [{resource}] {context}"),
            (Some(resource), None) => write!(f, " [{resource}]"),
            (None, Some(context)) => write!(f, " {context}"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type used by handlers and extractors.
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Every failure a handler can report, each bound to one HTTP status.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400: invalid request data, policy violation or rejected token.
    BadRequest,
    /// 401: no bearer token on a protected route.
    MissingAuthToken,
    /// 401: the `Authorization` header is not a bearer token.
    MalformedAuthToken,
    /// 401: bad credentials or an invalid session.
    Unauthorized,
    /// 404: the account or route does not exist.
    NotFound,
    /// 408: the request outlived the configured timeout.
    RequestTimeout,
    /// 409: the email or username is taken, or the account changed concurrently.
    Conflict,
    /// 500: a collaborator failed.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    #[inline]
    pub const fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Shorthand for `Error::new(kind).with_message(message)`.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        self.into_error().with_message(message)
    }

    /// Shorthand for `Error::new(kind).with_resource(resource)`.
    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        self.into_error().with_resource(resource)
    }

    /// Shorthand for `Error::new(kind).with_context(context)`.
    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        self.into_error().with_context(context)
    }

    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the default body for this kind.
    pub const fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::RequestTimeout => ErrorResponse::REQUEST_TIMEOUT,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().name)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_error_is_internal() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn overrides_reach_the_body() {
        let error = ErrorKind::NotFound
            .with_message("Account not found")
            .with_resource("account")
            .with_context("lookup by session subject");

        let body = error.to_response();
        assert_eq!(body.name, "not_found");
        assert_eq!(body.message, "Account not found");
        assert_eq!(body.resource.as_deref(), Some("account"));
        assert_eq!(body.context.as_deref(), Some("lookup by session subject"));
    }

    #[test]
    fn display_uses_the_rendered_body() {
        let plain = ErrorKind::Conflict.into_error().to_string();
        assert!(plain.starts_with("conflict (409 Conflict)"));
        assert!(plain.contains("conflicts with the current state"));

        let detailed = ErrorKind::BadRequest
            .with_message("Invalid request data")
            .with_resource("request")
            .to_string();
        assert!(detailed.ends_with("Invalid request data [request]"));
    }

    #[test]
    fn every_kind_has_a_fixed_status() {
        let kinds = [
            (ErrorKind::BadRequest, StatusCode::BAD_REQUEST),
            (ErrorKind::MissingAuthToken, StatusCode::UNAUTHORIZED),
            (ErrorKind::MalformedAuthToken, StatusCode::UNAUTHORIZED),
            (ErrorKind::Unauthorized, StatusCode::UNAUTHORIZED),
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::RequestTimeout, StatusCode::REQUEST_TIMEOUT),
            (ErrorKind::Conflict, StatusCode::CONFLICT),
            (ErrorKind::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (kind, status) in kinds {
            assert_eq!(kind.status_code(), status);
            assert_eq!(kind.to_string(), kind.response().name);
            assert_eq!(kind.into_response().status(), status);
        }
    }
}
