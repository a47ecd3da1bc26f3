//! End-to-end account lifecycle over the public router.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use foundation_identity::delivery::Outbox;
use foundation_identity::repository::MemoryAccountRepository;
use foundation_identity::security::Argon2PasswordHasher;
use foundation_identity::token::TokenPurpose;
use foundation_identity::{AuthenticationService, IdentityConfig};
use foundation_server::handler::response::{ErrorResponse, LoginResponse, RegisterResponse};
use foundation_server::handler::routes;
use foundation_server::middleware::RouterExt;
use foundation_server::service::{ServiceState, TokenExposure};
use serde_json::json;

async fn create_server(outbox: &Outbox) -> anyhow::Result<TestServer> {
    let config = IdentityConfig::new(
        "integration-session-secret-0123456789abcdef",
        "integration-purpose-secret-0123456789abcdef",
    );

    let authentication = AuthenticationService::from_config(
        &config,
        Arc::new(MemoryAccountRepository::new()),
        Arc::new(outbox.clone()),
    )
    .await?
    .with_password_hasher(Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1)?));

    let app = routes()
        .with_state(ServiceState::new(authentication, TokenExposure::ENABLED))
        .with_error_handling_layer(Duration::from_secs(10))
        .with_observability_layer();

    Ok(TestServer::new(app)?)
}

#[tokio::test]
async fn alice_registers_confirms_and_signs_in() -> anyhow::Result<()> {
    let outbox = Outbox::new();
    let server = create_server(&outbox).await?;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "a@x.com",
            "phoneNumber": "555",
            "password": "Secr3t!23"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let registered: RegisterResponse = response.json();
    let confirmation_token = registered
        .email_confirmation_token
        .ok_or_else(|| anyhow::anyhow!("token exposure is enabled"))?;
    assert_eq!(
        outbox
            .latest_token("a@x.com", TokenPurpose::EmailConfirmation)
            .await
            .as_deref(),
        Some(confirmation_token.as_str())
    );

    server
        .get("/auth/confirm-email")
        .add_query_param("email", "a@x.com")
        .add_query_param("token", &confirmation_token)
        .await
        .assert_status_ok();

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "a@x.com", "password": "Secr3t!23" }))
        .await;
    response.assert_status_ok();
    let session: LoginResponse = response.json();

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "a@x.com", "password": "wrong" }))
        .await;
    response.assert_status_unauthorized();
    let error: ErrorResponse = response.json();
    assert_eq!(error.message, "Invalid email or password");

    let response = server
        .put("/auth/update-user")
        .authorization_bearer(&session.token)
        .json(&json!({ "phoneNumber": "556" }))
        .await;
    response.assert_status_ok();
    let account: serde_json::Value = response.json();
    assert_eq!(account["phoneNumber"], "556");
    assert_eq!(account["emailConfirmed"], true);

    Ok(())
}

#[tokio::test]
async fn reset_token_cannot_confirm_email() -> anyhow::Result<()> {
    let outbox = Outbox::new();
    let server = create_server(&outbox).await?;

    server
        .post("/auth/register")
        .json(&json!({
            "username": "carol",
            "email": "c@x.com",
            "phoneNumber": "555",
            "password": "Secr3t!23"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "c@x.com" }))
        .await
        .assert_status_ok();

    let reset_token = outbox
        .latest_token("c@x.com", TokenPurpose::PasswordReset)
        .await
        .ok_or_else(|| anyhow::anyhow!("no reset token delivered"))?;

    server
        .get("/auth/confirm-email")
        .add_query_param("email", "c@x.com")
        .add_query_param("token", &reset_token)
        .await
        .assert_status_bad_request();

    Ok(())
}
