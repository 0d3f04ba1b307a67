//! Audit context propagation and the audit log
//!
//! The context lives in the single-row `audit_context` table for the
//! lifetime of one transaction. Triggers on audited tables read it through
//! the `current_audit_context` view.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use validator::Validate;
use vibesia_core::{
    AuditAction, AuditContext, AuditLogEntry, AuditLogPage, AuditQuery, FailureCode, Result,
    VibesiaError,
};

/// The six values the triggers copy into each audit row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AuditVariables {
    pub app_user_id: String,
    pub app_user_email: String,
    pub app_user_role: String,
    pub user_agent: String,
    pub api_endpoint: String,
    pub request_id: String,
}

impl From<&AuditContext> for AuditVariables {
    fn from(ctx: &AuditContext) -> Self {
        Self {
            app_user_id: ctx.app_user_id(),
            app_user_email: ctx.app_user_email().to_string(),
            app_user_role: ctx.app_user_role().to_string(),
            user_agent: ctx.user_agent.clone(),
            api_endpoint: ctx.endpoint.clone(),
            request_id: ctx.request_id.clone(),
        }
    }
}

/// Set the audit context for the current transaction
///
/// Must run inside a transaction; the row is only visible to it.
pub async fn apply_context(conn: &mut SqliteConnection, ctx: &AuditContext) -> Result<()> {
    let vars = AuditVariables::from(ctx);

    sqlx::query(
        "INSERT INTO audit_context (
            slot, app_user_id, app_user_email, app_user_role,
            user_agent, api_endpoint, request_id
        )
        VALUES (1, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(slot) DO UPDATE SET
            app_user_id = excluded.app_user_id,
            app_user_email = excluded.app_user_email,
            app_user_role = excluded.app_user_role,
            user_agent = excluded.user_agent,
            api_endpoint = excluded.api_endpoint,
            request_id = excluded.request_id",
    )
    .bind(&vars.app_user_id)
    .bind(&vars.app_user_email)
    .bind(&vars.app_user_role)
    .bind(&vars.user_agent)
    .bind(&vars.api_endpoint)
    .bind(&vars.request_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Remove the audit context before commit
pub async fn clear_context(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query("DELETE FROM audit_context WHERE slot = 1")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Context currently visible on `conn`, if any
pub async fn current_context(conn: &mut SqliteConnection) -> Result<Option<AuditVariables>> {
    let vars = sqlx::query_as::<_, AuditVariables>(
        "SELECT app_user_id, app_user_email, app_user_role, user_agent, api_endpoint, request_id
         FROM audit_context
         WHERE slot = 1",
    )
    .fetch_optional(&mut *conn)
    .await?;

    Ok(vars)
}

#[derive(FromRow)]
struct AuditLogRow {
    audit_id: i64,
    app_user_id: Option<String>,
    app_user_email: Option<String>,
    app_user_role: Option<String>,
    action_type: String,
    table_name: String,
    record_id: Option<i64>,
    old_values: Option<String>,
    new_values: Option<String>,
    timestamp: DateTime<Utc>,
    user_agent: Option<String>,
    api_endpoint: Option<String>,
    request_id: Option<String>,
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = VibesiaError;

    fn try_from(row: AuditLogRow) -> Result<Self> {
        let action_type = row.action_type.parse::<AuditAction>().map_err(|msg| {
            VibesiaError::transaction(FailureCode::StorageFailure, format!("Corrupt audit row: {msg}"))
        })?;

        Ok(Self {
            audit_id: row.audit_id,
            app_user_id: row.app_user_id,
            app_user_email: row.app_user_email,
            app_user_role: row.app_user_role,
            action_type,
            table_name: row.table_name,
            record_id: row.record_id,
            old_values: parse_snapshot(row.old_values),
            new_values: parse_snapshot(row.new_values),
            timestamp: row.timestamp,
            user_agent: row.user_agent,
            api_endpoint: row.api_endpoint,
            request_id: row.request_id,
        })
    }
}

fn parse_snapshot(raw: Option<String>) -> Option<Value> {
    raw.map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Row offset of the requested page
fn page_offset(query: &AuditQuery) -> Result<i64> {
    (query.page - 1)
        .checked_mul(query.per_page)
        .ok_or_else(|| VibesiaError::invalid("page", "Page is out of range"))
}

/// Page through the audit log, newest first
pub async fn list(pool: &SqlitePool, query: &AuditQuery) -> Result<AuditLogPage> {
    query.validate()?;
    let offset = page_offset(query)?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_log
         WHERE (? IS NULL OR table_name = ?)
           AND (? IS NULL OR record_id = ?)",
    )
    .bind(&query.table)
    .bind(&query.table)
    .bind(query.record_id)
    .bind(query.record_id)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, AuditLogRow>(
        "SELECT audit_id, app_user_id, app_user_email, app_user_role, action_type,
                table_name, record_id, old_values, new_values, timestamp,
                user_agent, api_endpoint, request_id
         FROM audit_log
         WHERE (? IS NULL OR table_name = ?)
           AND (? IS NULL OR record_id = ?)
         ORDER BY audit_id DESC
         LIMIT ? OFFSET ?",
    )
    .bind(&query.table)
    .bind(&query.table)
    .bind(query.record_id)
    .bind(query.record_id)
    .bind(query.per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let logs = rows
        .into_iter()
        .map(AuditLogEntry::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok(AuditLogPage {
        logs,
        total,
        page: query.page,
        per_page: query.per_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_parses_json_objects() {
        let value = parse_snapshot(Some(r#"{"position": 3}"#.to_string())).unwrap();
        assert_eq!(value["position"], 3);
        assert!(parse_snapshot(None).is_none());
    }

    #[test]
    fn page_offset_rejects_overflow() {
        let query = AuditQuery {
            page: 3,
            per_page: 20,
            ..Default::default()
        };
        assert_eq!(page_offset(&query).unwrap(), 40);

        let huge = AuditQuery {
            page: i64::MAX,
            per_page: 100,
            ..Default::default()
        };
        assert!(matches!(page_offset(&huge), Err(VibesiaError::Validation(_))));
    }

    #[test]
    fn variables_are_empty_for_anonymous_context() {
        let vars = AuditVariables::from(&AuditContext::anonymous());
        assert_eq!(vars.app_user_id, "");
        assert_eq!(vars.app_user_role, "");
    }
}
