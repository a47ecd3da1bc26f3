//! Conversions of middleware failures into [`Error`] responses.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower::BoxError;
use tower::timeout::error::Elapsed;

use crate::TRACING_TARGET_MIDDLEWARE as TRACING_TARGET;
use crate::handler::{Error, ErrorKind};

/// Transforms a [`BoxError`] raised by a tower layer into a response.
pub async fn handle_error(err: BoxError) -> Response {
    let error = if err.is::<Elapsed>() {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %err,
            "request timeout exceeded"
        );

        Error::new(ErrorKind::RequestTimeout)
    } else {
        tracing::error!(
            target: TRACING_TARGET,
            error = %err,
            "unknown middleware error"
        );

        Error::new(ErrorKind::InternalServerError)
    };

    error.into_response()
}

/// Transforms a handler panic into a generic internal error response.
pub fn catch_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    tracing::error!(
        target: TRACING_TARGET,
        panic = details,
        "handler panicked"
    );

    ErrorKind::InternalServerError.into_response()
}
