//! Audit context resolution
//!
//! Every request gets exactly one [`RequestContext`], built the first time
//! any extractor asks for it and cached in the request extensions. A missing,
//! malformed, expired or unknown token never fails the request here: it
//! simply yields an anonymous context. Endpoints that need a user use
//! [`CurrentUser`], which turns the anonymous case into 401.

use crate::{error::ServerError, state::AppState};
use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{header, request::Parts, HeaderMap},
};
use vibesia_core::{Actor, AuditContext, CatalogStorage, User, VibesiaError};

/// Header carrying the caller-supplied (or generated) request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Actor identity and request metadata for one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub audit: AuditContext,
    pub user: Option<User>,
}

impl RequestContext {
    pub fn actor(&self) -> Option<&Actor> {
        self.audit.actor()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn header_text(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// Resolve the token to a user, or `None` for anything short of a valid
/// token naming an existing account
async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, ServerError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let email = match state.auth_service.verify_access_token(token) {
        Ok(email) => email,
        Err(e) => {
            tracing::debug!("Ignoring invalid bearer token: {}", e);
            return Ok(None);
        }
    };

    let user = state.db.find_user_by_email(&email).await?;
    if user.is_none() {
        tracing::warn!(subject = %email, "Token subject does not match any user");
    }
    Ok(user)
}

async fn build_context(parts: &Parts, state: &AppState) -> Result<RequestContext, ServerError> {
    let user = resolve_user(state, &parts.headers).await?;

    let request_id = header_text(&parts.headers, REQUEST_ID_HEADER)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let user_agent = header_text(&parts.headers, header::USER_AGENT).unwrap_or_default();

    // Nested routers see the path with the mount prefix stripped
    let endpoint = parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |uri| uri.0.path())
        .to_string();

    let mut audit = AuditContext::anonymous().with_request(user_agent, endpoint, request_id);
    if let Some(user) = &user {
        audit = audit.with_actor(Actor::resolve(user, &state.admin_policy));
    }

    Ok(RequestContext { audit, user })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<RequestContext>() {
            return Ok(cached.clone());
        }

        let context = build_context(parts, state).await?;
        tracing::debug!(
            user_id = %context.audit.app_user_id(),
            request_id = %context.audit.request_id,
            "Request context resolved"
        );
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}

/// An authenticated, active user
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub actor: Actor,
    pub audit: AuditContext,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_request_parts(parts, state).await?;

        let (Some(user), Some(actor)) = (context.user.clone(), context.actor().cloned()) else {
            return Err(VibesiaError::Unauthorized("Could not validate credentials".to_string()).into());
        };

        if !actor.is_active {
            return Err(VibesiaError::Forbidden("Inactive user".to_string()).into());
        }

        Ok(Self {
            user,
            actor,
            audit: context.audit,
        })
    }
}

/// An authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.actor.is_admin() {
            tracing::warn!(user_id = %current.user.id, "Admin endpoint refused");
            return Err(VibesiaError::Forbidden("Administrator access required".to_string()).into());
        }
        Ok(Self(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());
    }
}
