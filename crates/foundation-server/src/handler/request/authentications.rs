//! Authentication request types.

use std::fmt;

use foundation_identity::Registration;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for registration.
#[must_use]
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display username, unique case-insensitively.
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    /// Email address of the account.
    #[validate(email)]
    #[validate(length(min = 3, max = 254))]
    pub email: String,

    /// Phone number of the account holder.
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,

    /// Password, checked against the password policy.
    #[validate(length(min = 1, max = 1024))]
    pub password: String,

    /// Profile photo URL.
    #[validate(url)]
    #[validate(length(max = 2048))]
    pub photo_url: Option<String>,
}

impl RegisterRequest {
    /// Converts this request into the core registration data.
    pub fn into_registration(self) -> Registration {
        Registration {
            username: self.username,
            email: self.email,
            phone_number: Some(self.phone_number),
            password: self.password,
            photo_url: self.photo_url,
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("photo_url", &self.photo_url)
            .finish_non_exhaustive()
    }
}

/// Query parameters of the email confirmation link.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailQuery {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 512))]
    pub token: String,
}

/// Request payload for login.
#[must_use]
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address of the account.
    #[validate(length(min = 1, max = 254))]
    pub email: String,

    /// Password of the account.
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Request payload for password reset initiation.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    /// Email address of the account to reset the password for.
    #[validate(length(min = 1, max = 254))]
    pub email: String,
}

/// Request payload for password reset completion.
#[must_use]
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Email address of the account.
    #[validate(length(min = 1, max = 254))]
    pub email: String,

    /// Password reset token delivered out of band.
    #[validate(length(min = 1, max = 512))]
    pub token: String,

    /// Replacement password, checked against the password policy.
    #[validate(length(min = 1, max = 1024))]
    pub new_password: String,
}

impl fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_owned(),
            email: "a@x.com".to_owned(),
            phone_number: "555".to_owned(),
            password: "Secr3t!23".to_owned(),
            photo_url: None,
        }
    }

    #[test]
    fn register_request_validates() {
        assert!(register_request().validate().is_ok());

        let request = RegisterRequest {
            email: "not-an-email".to_owned(),
            ..register_request()
        };
        assert!(request.validate().is_err());

        let request = RegisterRequest {
            photo_url: Some("not a url".to_owned()),
            ..register_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn register_request_uses_camel_case() -> anyhow::Result<()> {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "email": "a@x.com",
            "phoneNumber": "555",
            "password": "Secr3t!23",
            "photoUrl": "https://example.com/alice.png"
        }))?;

        let registration = request.into_registration();
        assert_eq!(registration.phone_number.as_deref(), Some("555"));
        assert_eq!(
            registration.photo_url.as_deref(),
            Some("https://example.com/alice.png")
        );
        Ok(())
    }

    #[test]
    fn debug_omits_passwords() {
        let debug = format!("{:?}", register_request());
        assert!(!debug.contains("Secr3t!23"));

        let request = ResetPasswordRequest {
            email: "a@x.com".to_owned(),
            token: "token".to_owned(),
            new_password: "N3w!Passw0rd".to_owned(),
        };
        let debug = format!("{:?}", request);
        assert!(!debug.contains("N3w!Passw0rd"));
    }
}
