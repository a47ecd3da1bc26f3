//! Registration, email confirmation, login and password reset handlers.
//!
//! Responses of the login and password reset endpoints never reveal whether
//! an email address belongs to an account.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use foundation_identity::AuthenticationService;
use validator::Validate;

use super::request::{
    ConfirmEmailQuery, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use super::response::{LoginResponse, MessageResponse, RegisterResponse};
use crate::extract::{Json, Query, ValidateJson};
use crate::handler::Result;
use crate::service::{ServiceState, TokenExposure};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "foundation_server::handler::authentication";

/// Message returned by forgot-password for every email address.
const FORGOT_PASSWORD_MESSAGE: &str = "If that email exists, a reset email has been sent.";

/// Creates an unconfirmed account and starts email confirmation.
#[tracing::instrument(skip_all)]
async fn register(
    State(authentication): State<AuthenticationService>,
    State(token_exposure): State<TokenExposure>,
    ValidateJson(request): ValidateJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    tracing::trace!(target: TRACING_TARGET, "registration attempt");

    let registered = authentication
        .register(request.into_registration())
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %registered.account.id,
        "account registered"
    );

    let response = RegisterResponse {
        message: "User created. Please confirm email.".to_owned(),
        email_confirmation_token: token_exposure
            .is_enabled()
            .then_some(registered.email_confirmation_token),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Confirms the email address named in a confirmation link.
#[tracing::instrument(skip_all)]
async fn confirm_email(
    State(authentication): State<AuthenticationService>,
    Query(query): Query<ConfirmEmailQuery>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    query.validate()?;

    let account = authentication
        .confirm_email(&query.email, &query.token)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        "email confirmed"
    );

    let response = MessageResponse::new("Email confirmed successfully!");
    Ok((StatusCode::OK, Json(response)))
}

/// Exchanges credentials for a session token.
#[tracing::instrument(skip_all)]
async fn login(
    State(authentication): State<AuthenticationService>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    tracing::trace!(target: TRACING_TARGET, "login attempt");

    let token = authentication
        .login(&request.email, &request.password)
        .await?;

    Ok((StatusCode::OK, Json(LoginResponse { token })))
}

/// Starts a password reset; the response is identical for unknown emails.
#[tracing::instrument(skip_all)]
async fn forgot_password(
    State(authentication): State<AuthenticationService>,
    ValidateJson(request): ValidateJson<ForgotPasswordRequest>,
) -> (StatusCode, Json<MessageResponse>) {
    authentication.forgot_password(&request.email).await;

    let response = MessageResponse::new(FORGOT_PASSWORD_MESSAGE);
    (StatusCode::OK, Json(response))
}

/// Replaces a forgotten password using a reset token.
#[tracing::instrument(skip_all)]
async fn reset_password(
    State(authentication): State<AuthenticationService>,
    ValidateJson(request): ValidateJson<ResetPasswordRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    authentication
        .reset_password(&request.email, &request.token, &request.new_password)
        .await?;

    let response = MessageResponse::new("Password has been reset successfully.");
    Ok((StatusCode::OK, Json(response)))
}

/// Returns a [`Router`] with all public authentication routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/confirm-email", get(confirm_email))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}
