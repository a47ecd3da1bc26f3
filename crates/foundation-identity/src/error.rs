//! Error types for the identity core.
//!
//! Every failure is scoped to a single operation and categorized by an
//! [`ErrorKind`]. Several kinds are deliberately coarse: callers must not be
//! able to tell "no such account" apart from "wrong password" or learn which
//! check rejected a token.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for identity operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing identity errors.
///
/// Separated from [`Error`] to allow pattern matching on the category
/// without accessing the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or policy-violating request data.
    InvalidInput,
    /// Uniqueness violation or a lost optimistic-update race.
    Conflict,
    /// The referenced account does not exist.
    NotFound,
    /// Unknown email or wrong password, reported identically.
    InvalidCredentials,
    /// Login attempted before the email address was confirmed.
    EmailNotConfirmed,
    /// Purpose token is expired, malformed, tampered, stale or for another purpose.
    TokenInvalid,
    /// Session token missing or invalid.
    Unauthenticated,
    /// Collaborator failure (storage, hashing, signing).
    Unexpected,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::TokenInvalid => "token_invalid",
            Self::Unauthenticated => "unauthenticated",
            Self::Unexpected => "unexpected",
        }
    }

    /// Creates an [`Error`] of this kind with the given message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the error followed by every error in its source chain.
    #[must_use]
    pub fn display_chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = StdError::source(self);
        while let Some(error) = source {
            rendered.push_str(": ");
            rendered.push_str(&error.to_string());
            source = error.source();
        }

        rendered
    }

    /// Creates a new invalid input error.
    #[inline]
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Creates a new conflict error.
    #[inline]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates a new not found error.
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates the single login failure reported for unknown emails and wrong passwords.
    #[inline]
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid email or password")
    }

    /// Creates a new email not confirmed error.
    #[inline]
    pub fn email_not_confirmed() -> Self {
        Self::new(
            ErrorKind::EmailNotConfirmed,
            "Email not confirmed, please confirm your email first",
        )
    }

    /// Creates the single error reported for every purpose token rejection.
    #[inline]
    pub fn token_invalid() -> Self {
        Self::new(ErrorKind::TokenInvalid, "Invalid or expired token")
    }

    /// Creates a new unauthenticated error.
    #[inline]
    pub fn unauthenticated() -> Self {
        Self::new(ErrorKind::Unauthenticated, "Authentication required")
    }

    /// Creates a new unexpected (collaborator) error.
    #[inline]
    pub fn unexpected(
        collaborator: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let collaborator = collaborator.into();
        let message = message.into();
        Self::new(ErrorKind::Unexpected, format!("{collaborator}: {message}"))
    }
}
