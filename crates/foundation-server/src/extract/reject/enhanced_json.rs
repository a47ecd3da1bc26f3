//! JSON body extractor and response wrapper.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// [`axum::Json`] whose rejections render as [`Error`] bodies.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumJson(value) = AxumJson::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        let detail = sanitize_error_message(&rejection.body_text());
        let (kind, message, context) = match rejection {
            JsonRejection::MissingJsonContentType(_) => (
                ErrorKind::BadRequest,
                "Invalid content type",
                "Expected 'Content-Type: application/json'".to_owned(),
            ),
            JsonRejection::JsonSyntaxError(_) => {
                (ErrorKind::BadRequest, "Malformed JSON in request body", detail)
            }
            JsonRejection::JsonDataError(_) => {
                (ErrorKind::BadRequest, "Request body has the wrong shape", detail)
            }
            JsonRejection::BytesRejection(_) => {
                (ErrorKind::BadRequest, "Failed to read request body", detail)
            }
            _ => (ErrorKind::InternalServerError, "Request processing failed", detail),
        };

        kind.with_message(message).with_context(context)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::post;
    use axum_test::TestServer;
    use serde::Deserialize;

    use super::*;
    use crate::handler::response::ErrorResponse;

    #[derive(Debug, Serialize, Deserialize)]
    struct Greeting {
        name: String,
    }

    fn server() -> anyhow::Result<TestServer> {
        let echo = |Json(greeting): Json<Greeting>| async move { Json(greeting) };
        let router = Router::new().route("/", post(echo));
        Ok(TestServer::new(router)?)
    }

    #[tokio::test]
    async fn accepts_well_formed_bodies() -> anyhow::Result<()> {
        let response = server()?
            .post("/")
            .json(&serde_json::json!({ "name": "alice" }))
            .await;

        response.assert_status_ok();
        let greeting: Greeting = response.json();
        assert_eq!(greeting.name, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn rejections_are_json_errors() -> anyhow::Result<()> {
        let server = server()?;

        let wrong_shape = server
            .post("/")
            .json(&serde_json::json!({ "name": 7 }))
            .expect_failure()
            .await;
        let error: ErrorResponse = wrong_shape.json();
        assert_eq!(error.name, "bad_request");
        assert_eq!(error.message, "Request body has the wrong shape");

        let plain_text = server.post("/").text("name=alice").expect_failure().await;
        plain_text.assert_status_bad_request();
        let error: ErrorResponse = plain_text.json();
        assert_eq!(error.message, "Invalid content type");
        Ok(())
    }
}
