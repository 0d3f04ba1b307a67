/// User and actor types
use super::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Data for creating a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile changes; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

/// Capability level of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user a request is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

impl Actor {
    /// Build the actor for `user`, evaluating the admin policy once
    pub fn resolve(user: &User, policy: &AdminPolicy) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: policy.role_for(user),
            is_active: user.is_active,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Who counts as an administrator
///
/// A user is an admin if any of email (case-insensitive), username or id
/// is configured.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: HashSet<String>,
    usernames: HashSet<String>,
    user_ids: HashSet<i64>,
}

impl AdminPolicy {
    pub fn new<E, U, I>(emails: E, usernames: U, user_ids: I) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        U: IntoIterator,
        U::Item: Into<String>,
        I: IntoIterator<Item = i64>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().to_lowercase())
                .collect(),
            usernames: usernames.into_iter().map(Into::into).collect(),
            user_ids: user_ids.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        self.emails.contains(&user.email.to_lowercase())
            || self.usernames.contains(&user.username)
            || self.user_ids.contains(&user.id.get())
    }

    pub fn role_for(&self, user: &User) -> Role {
        if self.is_admin(user) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, username: &str, email: &str) -> User {
        User {
            id: UserId::new(id),
            username: username.to_string(),
            email: email.to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_by_email_ignores_case() {
        let policy = AdminPolicy::new(["Admin@Vibesia.com"], Vec::<String>::new(), []);
        assert!(policy.is_admin(&user(1, "someone", "admin@vibesia.com")));
    }

    #[test]
    fn admin_by_username_or_id() {
        let policy = AdminPolicy::new(Vec::<String>::new(), ["superuser"], [22]);
        assert!(policy.is_admin(&user(5, "superuser", "a@example.com")));
        assert!(policy.is_admin(&user(22, "plain", "b@example.com")));
        assert!(!policy.is_admin(&user(6, "plain", "c@example.com")));
    }

    #[test]
    fn actor_carries_resolved_role() {
        let policy = AdminPolicy::new(["root@example.com"], Vec::<String>::new(), []);
        let admin = Actor::resolve(&user(1, "root", "root@example.com"), &policy);
        let regular = Actor::resolve(&user(2, "bob", "bob@example.com"), &policy);

        assert!(admin.is_admin());
        assert_eq!(regular.role, Role::User);
        assert_eq!(regular.role.as_str(), "user");
    }
}
