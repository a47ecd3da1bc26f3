//! Extension traits for `axum::Router` to apply middleware layers.

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::header::{self, HeaderName};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::error_handling::{catch_panic, handle_error};

/// Header carrying the per-request identifier.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Largest accepted request body, in bytes.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Extension trait for `axum::`[`Router`] for layering middleware.
pub trait RouterExt<S> {
    /// Layers [`HandleError`], [`CatchPanic`], [`Timeout`] and a request body
    /// size limit.
    ///
    /// [`HandleError`]: axum::error_handling::HandleErrorLayer
    /// [`CatchPanic`]: tower_http::catch_panic::CatchPanicLayer
    /// [`Timeout`]: tower::timeout::TimeoutLayer
    fn with_error_handling_layer(self, timeout: Duration) -> Self;

    /// Layers request ids, request tracing and redaction of the
    /// `Authorization` header in traces.
    fn with_observability_layer(self) -> Self;
}

impl<S> RouterExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_error_handling_layer(self, timeout: Duration) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .layer(CatchPanicLayer::custom(catch_panic))
            .layer(TimeoutLayer::new(timeout))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE));

        self.layer(middlewares)
    }

    fn with_observability_layer(self) -> Self {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        // Outermost last: ids are assigned and credentials redacted before
        // tracing sees the request.
        self.layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }
}
