//! Conversion of core identity errors into HTTP errors.

use foundation_identity::{Error as IdentityError, ErrorKind as IdentityErrorKind};

use crate::TRACING_TARGET_HANDLER as TRACING_TARGET;
use crate::handler::{Error, ErrorKind};

impl From<IdentityError> for Error<'static> {
    fn from(error: IdentityError) -> Self {
        let kind = match error.kind() {
            IdentityErrorKind::InvalidInput
            | IdentityErrorKind::TokenInvalid
            | IdentityErrorKind::EmailNotConfirmed => ErrorKind::BadRequest,
            IdentityErrorKind::InvalidCredentials | IdentityErrorKind::Unauthenticated => {
                ErrorKind::Unauthorized
            }
            IdentityErrorKind::NotFound => ErrorKind::NotFound,
            IdentityErrorKind::Conflict => ErrorKind::Conflict,
            IdentityErrorKind::Unexpected => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error.display_chain(),
                    "identity collaborator failure"
                );

                // Collaborator details stay in the logs.
                return ErrorKind::InternalServerError.into_error();
            }
        };

        kind.with_message(error.message().to_owned())
    }
}
