//! JSON extractor with `validator` checks.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// Deserializes a JSON body with [`Json`] and then runs [`Validate`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

fn param_as_u64(params: &HashMap<Cow<'static, str>, serde_json::Value>, key: &str) -> Option<u64> {
    params.get(key).and_then(serde_json::Value::as_u64)
}

fn format_length_error(field: &str, error: &ValidationError) -> String {
    match (
        param_as_u64(&error.params, "min"),
        param_as_u64(&error.params, "max"),
    ) {
        (Some(1), Some(max)) => {
            format!("Field '{field}' is required and must be at most {max} characters long")
        }
        (Some(min), Some(max)) => {
            format!("Field '{field}' must be between {min} and {max} characters long")
        }
        (Some(min), None) => format!("Field '{field}' must be at least {min} characters long"),
        (None, Some(max)) => format!("Field '{field}' must be at most {max} characters long"),
        (None, None) => format!("Field '{field}' has invalid length"),
    }
}

/// Formats a single field failure as a client-facing sentence.
fn format_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(custom_message) = &error.message {
        return format!("Field '{field}': {custom_message}");
    }

    match error.code.as_ref() {
        "length" => format_length_error(field, error),
        "email" => format!("Field '{field}' must be a valid email address"),
        "url" => format!("Field '{field}' must be a valid URL"),
        "required" => format!("Field '{field}' is required"),
        code => format!("Field '{field}' failed validation: {code}"),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();
        error_messages.sort();

        tracing::debug!(
            target: crate::TRACING_TARGET_HANDLER,
            errors = ?errors.field_errors(),
            "request validation failed"
        );

        let message = match error_messages.as_slice() {
            [] => "Validation failed".to_owned(),
            messages => messages.join(". "),
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("request")
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(email)]
        email: String,
        #[validate(length(min = 1, max = 8))]
        name: String,
    }

    #[test]
    fn validation_errors_become_bad_request() {
        let sample = Sample {
            email: "nope".to_owned(),
            name: String::new(),
        };

        let errors = sample.validate().expect_err("sample is invalid");
        let error = Error::from(errors);

        assert_eq!(error.kind(), ErrorKind::BadRequest);
        let message = error.message().unwrap_or_default();
        assert!(message.contains("Field 'email' must be a valid email address"));
        assert!(message.contains("Field 'name' is required"));
    }
}
