//! Profile update handler for the signed-in account.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::put;
use foundation_identity::AuthenticationService;

use super::request::UpdateUserRequest;
use super::response::Account;
use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::Result;
use crate::service::ServiceState;

/// Tracing target for account operations.
const TRACING_TARGET: &str = "foundation_server::handler::accounts";

/// Updates the profile of the account named by the session token.
#[tracing::instrument(skip_all)]
async fn update_user(
    State(authentication): State<AuthenticationService>,
    AuthState(claims): AuthState,
    ValidateJson(request): ValidateJson<UpdateUserRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        account_id = %claims.account_id,
        has_username = request.username.is_some(),
        has_phone_number = request.phone_number.is_some(),
        has_photo_url = request.photo_url.is_some(),
        "updating account"
    );

    let account = authentication
        .update_profile(&claims, request.into_changes())
        .await?;

    Ok((StatusCode::OK, Json(Account::from_model(account))))
}

/// Returns a [`Router`] with all routes that require a session token.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/auth/update-user", put(update_user))
}

#[cfg(test)]
mod tests {
    use foundation_identity::token::TokenPurpose;

    use super::*;
    use crate::handler::response::{ErrorResponse, LoginResponse};
    use crate::handler::test::{TestContext, create_test_context};
    use crate::service::TokenExposure;

    /// Registers, confirms and signs in `username`, returning a session token.
    async fn sign_in(context: &TestContext, username: &str) -> anyhow::Result<String> {
        let email = format!("{username}@x.com");

        context
            .server
            .post("/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "phoneNumber": "555",
                "password": "Secr3t!23"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let token = context
            .outbox
            .latest_token(&email, TokenPurpose::EmailConfirmation)
            .await
            .ok_or_else(|| anyhow::anyhow!("no confirmation token delivered"))?;

        context
            .server
            .get("/auth/confirm-email")
            .add_query_param("email", &email)
            .add_query_param("token", &token)
            .await
            .assert_status_ok();

        let response = context
            .server
            .post("/auth/login")
            .json(&serde_json::json!({ "email": email, "password": "Secr3t!23" }))
            .await;
        response.assert_status_ok();

        let body: LoginResponse = response.json();
        Ok(body.token)
    }

    #[tokio::test]
    async fn update_user_applies_present_fields() -> anyhow::Result<()> {
        let context = create_test_context(TokenExposure::DISABLED).await?;
        let token = sign_in(&context, "alice").await?;

        let response = context
            .server
            .put("/auth/update-user")
            .authorization_bearer(&token)
            .json(&serde_json::json!({ "photoUrl": "https://example.com/alice.png" }))
            .await;
        response.assert_status_ok();

        let account: Account = response.json();
        assert_eq!(account.username, "alice");
        assert_eq!(account.phone_number.as_deref(), Some("555"));
        assert_eq!(
            account.photo_url.as_deref(),
            Some("https://example.com/alice.png")
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_user_requires_session() -> anyhow::Result<()> {
        let context = create_test_context(TokenExposure::DISABLED).await?;
        let body = serde_json::json!({ "username": "mallory" });

        let response = context.server.put("/auth/update-user").json(&body).await;
        response.assert_status_unauthorized();
        let error: ErrorResponse = response.json();
        assert_eq!(error.name, "missing_auth_token");

        let response = context
            .server
            .put("/auth/update-user")
            .authorization_bearer("not-a-session-token")
            .json(&body)
            .await;
        response.assert_status_unauthorized();
        let error: ErrorResponse = response.json();
        assert_eq!(error.name, "unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn update_user_rejects_taken_username() -> anyhow::Result<()> {
        let context = create_test_context(TokenExposure::DISABLED).await?;
        sign_in(&context, "alice").await?;
        let token = sign_in(&context, "bob").await?;

        let response = context
            .server
            .put("/auth/update-user")
            .authorization_bearer(&token)
            .json(&serde_json::json!({ "username": "ALICE" }))
            .await;
        response.assert_status_conflict();

        let response = context
            .server
            .put("/auth/update-user")
            .authorization_bearer(&token)
            .json(&serde_json::json!({ "username": "" }))
            .await;
        response.assert_status_bad_request();
        Ok(())
    }
}
