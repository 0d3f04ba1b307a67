//! Audit context and audit log types
//!
//! An [`AuditContext`] is resolved once per request and handed to every
//! storage mutation. Storage writes its six values into the transaction
//! before the first audited statement; database triggers copy them into
//! each `audit_log` row.

use super::user::Actor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Request-scoped actor identity and metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditContext {
    /// `None` for anonymous requests
    pub actor: Option<Actor>,
    pub user_agent: String,
    pub endpoint: String,
    pub request_id: String,
}

impl AuditContext {
    /// Anonymous context with empty metadata
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for work not driven by an HTTP request (CLI, maintenance)
    pub fn system(endpoint: impl Into<String>) -> Self {
        Self {
            actor: None,
            user_agent: concat!("vibesia/", env!("CARGO_PKG_VERSION")).to_string(),
            endpoint: endpoint.into(),
            request_id: String::new(),
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub fn with_request(
        mut self,
        user_agent: impl Into<String>,
        endpoint: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        self.user_agent = user_agent.into();
        self.endpoint = endpoint.into();
        self.request_id = request_id.into();
        self
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Actor id as written to the audit trail, empty when anonymous
    pub fn app_user_id(&self) -> String {
        self.actor
            .as_ref()
            .map(|a| a.user_id.to_string())
            .unwrap_or_default()
    }

    pub fn app_user_email(&self) -> &str {
        self.actor.as_ref().map_or("", |a| a.email.as_str())
    }

    pub fn app_user_role(&self) -> &str {
        self.actor.as_ref().map_or("", |a| a.role.as_str())
    }
}

/// Kind of row change recorded by the audit triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Insert => "INSERT",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(AuditAction::Insert),
            "UPDATE" => Ok(AuditAction::Update),
            "DELETE" => Ok(AuditAction::Delete),
            other => Err(format!("unknown audit action '{other}'")),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub audit_id: i64,
    pub app_user_id: Option<String>,
    pub app_user_email: Option<String>,
    pub app_user_role: Option<String>,
    pub action_type: AuditAction,
    pub table_name: String,
    pub record_id: Option<i64>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub api_endpoint: Option<String>,
    pub request_id: Option<String>,
}

/// Audit log filter, 1-based pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AuditQuery {
    pub table: Option<String>,
    pub record_id: Option<i64>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100))]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            table: None,
            record_id: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// A page of audit rows, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogPage {
    pub logs: Vec<AuditLogEntry>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, UserId};

    #[test]
    fn anonymous_context_has_empty_actor_fields() {
        let ctx = AuditContext::anonymous().with_request("curl/8", "/api/v1/songs/1", "req-1");
        assert_eq!(ctx.app_user_id(), "");
        assert_eq!(ctx.app_user_email(), "");
        assert_eq!(ctx.app_user_role(), "");
        assert_eq!(ctx.endpoint, "/api/v1/songs/1");
    }

    #[test]
    fn actor_fields_follow_actor() {
        let ctx = AuditContext::anonymous().with_actor(Actor {
            user_id: UserId::new(9),
            email: "dj@example.com".to_string(),
            role: Role::Admin,
            is_active: true,
        });
        assert_eq!(ctx.app_user_id(), "9");
        assert_eq!(ctx.app_user_email(), "dj@example.com");
        assert_eq!(ctx.app_user_role(), "admin");
    }

    #[test]
    fn audit_action_round_trips_database_text() {
        assert_eq!("DELETE".parse::<AuditAction>().unwrap(), AuditAction::Delete);
        assert!("TRUNCATE".parse::<AuditAction>().is_err());
    }
}
