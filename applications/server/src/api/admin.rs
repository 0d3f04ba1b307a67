/// Admin API routes
use crate::{
    error::Result,
    middleware::{AdminUser, ValidatedQuery},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use vibesia_core::{AuditLogPage, AuditQuery, CatalogStorage, User, UserId, VibesiaError};

/// GET /api/v1/admin/audit
/// Page through the audit trail, optionally filtered by table and record
pub async fn audit_log(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidatedQuery(query): ValidatedQuery<AuditQuery>,
) -> Result<Json<AuditLogPage>> {
    tracing::debug!(
        admin_id = %admin.user.id,
        table = ?query.table,
        record_id = ?query.record_id,
        "Audit log requested"
    );

    let page = app_state.db.audit_log(&query).await?;
    Ok(Json(page))
}

/// GET /api/v1/admin/users/:id
pub async fn get_user(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = app_state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| VibesiaError::not_found("User", id))?;
    Ok(Json(user))
}

/// PUT /api/v1/admin/users/:id/deactivate
pub async fn deactivate_user(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = app_state.db.set_user_active(&admin.audit, id, false).await?;
    tracing::info!(admin_id = %admin.user.id, user_id = %id, "User deactivated");
    Ok(Json(user))
}

/// PUT /api/v1/admin/users/:id/reactivate
pub async fn reactivate_user(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = app_state.db.set_user_active(&admin.audit, id, true).await?;
    tracing::info!(admin_id = %admin.user.id, user_id = %id, "User reactivated");
    Ok(Json(user))
}
