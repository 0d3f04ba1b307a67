/// Authentication API routes
use crate::{
    error::{Result, ServerError},
    middleware::ValidatedJson,
    state::AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vibesia_core::{CatalogStorage, User, VibesiaError};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email or username
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn invalid_credentials() -> ServerError {
    ServerError::Auth("Incorrect username or password".to_string())
}

fn ensure_active(user: &User) -> Result<()> {
    if user.is_active {
        Ok(())
    } else {
        Err(VibesiaError::Forbidden("Inactive user".to_string()).into())
    }
}

/// POST /api/v1/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = app_state
        .db
        .find_user_by_login(&req.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_hash = app_state
        .db
        .get_password_hash(user.id)
        .await?
        .ok_or_else(invalid_credentials)?;

    // A malformed stored hash counts as a failed login
    let verified = app_state
        .auth_service
        .verify_password(&req.password, &password_hash)
        .unwrap_or(false);
    if !verified {
        tracing::info!(login = %req.username, "Failed login attempt");
        return Err(invalid_credentials());
    }

    ensure_active(&user)?;

    let access_token = app_state.auth_service.create_access_token(&user.email)?;
    let refresh_token = app_state.auth_service.create_refresh_token(&user.email)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        expires_in: app_state.auth_service.access_expires_in(),
    }))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(app_state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let email = app_state
        .auth_service
        .verify_refresh_token(&req.refresh_token)?;

    let user = app_state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ServerError::Auth("User no longer exists".to_string()))?;
    ensure_active(&user)?;

    let access_token = app_state.auth_service.create_access_token(&user.email)?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: app_state.auth_service.access_expires_in(),
    }))
}
