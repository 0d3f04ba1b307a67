/// User API routes: registration and the caller's own profile
use crate::{
    error::Result,
    middleware::{CurrentUser, RequestContext, ValidatedJson},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vibesia_core::{CatalogStorage, NewUser, Role, User, UserChanges, UserId};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct DeletedAccountResponse {
    pub message: String,
    pub user_id: UserId,
}

/// POST /api/v1/users
/// Public registration; audited with whatever actor the request carries
pub async fn register(
    State(app_state): State<AppState>,
    context: RequestContext,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let password_hash = app_state.auth_service.hash_password(&req.password)?;

    let user = app_state
        .db
        .create_user(
            &context.audit,
            NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            },
        )
        .await?;

    tracing::info!(user_id = %user.id, "New user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/me
pub async fn me(current: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: current.user,
        role: current.actor.role,
    })
}

/// PUT /api/v1/users/me
///
/// Changing the email invalidates existing tokens, whose subject is the old one.
pub async fn update_me(
    State(app_state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateMeRequest>,
) -> Result<Json<MeResponse>> {
    let password_hash = req
        .password
        .as_deref()
        .map(|password| app_state.auth_service.hash_password(password))
        .transpose()?;

    let user = app_state
        .db
        .update_user(
            &current.audit,
            current.user.id,
            UserChanges {
                username: req.username,
                email: req.email,
                password_hash,
            },
        )
        .await?;

    Ok(Json(MeResponse {
        role: app_state.admin_policy.role_for(&user),
        user,
    }))
}

/// DELETE /api/v1/users/me
/// Permanently delete the caller's account and playlists
pub async fn delete_me(
    State(app_state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<DeletedAccountResponse>> {
    let user = app_state
        .db
        .delete_user(&current.audit, current.user.id)
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User deleted their account");

    Ok(Json(DeletedAccountResponse {
        message: "Your account has been permanently deleted.".to_string(),
        user_id: user.id,
    }))
}
