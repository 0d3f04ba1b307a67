//! User accounts and login lookups

use sqlx::{Row, SqliteConnection, SqlitePool};
use vibesia_core::{error::Result, types::*, VibesiaError};

pub use vibesia_core::types::{NewUser, UserChanges};

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("user_id"),
        username: row.get("username"),
        email: row.get("email"),
        is_active: row.get::<i64, _>("is_active") != 0,
        created_at: row.get("created_at"),
    }
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT user_id, username, email, is_active, created_at FROM users WHERE user_id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Get user by email, ignoring case
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT user_id, username, email, is_active, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Find user by email or username
pub async fn find_by_login(pool: &SqlitePool, login: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT user_id, username, email, is_active, created_at
        FROM users
        WHERE email = ? OR username = ?
        ORDER BY user_id
        LIMIT 1
        "#,
    )
    .bind(login)
    .bind(login)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Get user's password hash for authentication
pub async fn get_password_hash(pool: &SqlitePool, id: UserId) -> Result<Option<String>> {
    let hash = sqlx::query_scalar("SELECT hashed_password FROM users WHERE user_id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(hash)
}

/// Get all users
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        "SELECT user_id, username, email, is_active, created_at FROM users ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(user_from_row).collect())
}

/// Insert a user inside an audited transaction
pub async fn create(conn: &mut SqliteConnection, user: &NewUser) -> Result<User> {
    let taken: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE email = ? OR username = ?",
    )
    .bind(&user.email)
    .bind(&user.username)
    .fetch_one(&mut *conn)
    .await?;

    if taken > 0 {
        return Err(VibesiaError::duplicate(
            "User",
            format!("{} / {}", user.username, user.email),
        ));
    }

    let result = sqlx::query(
        "INSERT INTO users (username, email, hashed_password) VALUES (?, ?, ?)",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .execute(&mut *conn)
    .await?;

    fetch_in(conn, UserId::new(result.last_insert_rowid())).await
}

/// User as seen by the current transaction
async fn fetch_in(conn: &mut SqliteConnection, id: UserId) -> Result<User> {
    let row = sqlx::query(
        "SELECT user_id, username, email, is_active, created_at FROM users WHERE user_id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref()
        .map(user_from_row)
        .ok_or_else(|| VibesiaError::not_found("User", id))
}

/// Apply profile changes; a username or email held by another account is rejected
pub async fn update(conn: &mut SqliteConnection, id: UserId, changes: &UserChanges) -> Result<User> {
    let current = fetch_in(conn, id).await?;
    if changes.is_empty() {
        return Ok(current);
    }

    if let Some(username) = &changes.username {
        ensure_free(conn, "username", username, id).await?;
    }
    if let Some(email) = &changes.email {
        ensure_free(conn, "email", email, id).await?;
    }

    sqlx::query(
        r#"
        UPDATE users
        SET username = COALESCE(?, username),
            email = COALESCE(?, email),
            hashed_password = COALESCE(?, hashed_password),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE user_id = ?
        "#,
    )
    .bind(&changes.username)
    .bind(&changes.email)
    .bind(&changes.password_hash)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    tracing::info!(user_id = %id, "User profile updated");
    fetch_in(conn, id).await
}

async fn ensure_free(
    conn: &mut SqliteConnection,
    column: &'static str,
    value: &str,
    owner: UserId,
) -> Result<()> {
    let query = format!("SELECT user_id FROM users WHERE {column} = ? AND user_id != ?");
    let holder: Option<UserId> = sqlx::query_scalar(&query)
        .bind(value)
        .bind(owner)
        .fetch_optional(&mut *conn)
        .await?;

    match holder {
        Some(_) => Err(VibesiaError::duplicate("User", value)),
        None => Ok(()),
    }
}

/// Delete an account; playlists and their entries cascade
pub async fn delete(conn: &mut SqliteConnection, id: UserId) -> Result<User> {
    let user = fetch_in(conn, id).await?;

    sqlx::query("DELETE FROM users WHERE user_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    tracing::info!(user_id = %id, "User deleted");
    Ok(user)
}

/// Activate or deactivate an account
pub async fn set_active(conn: &mut SqliteConnection, id: UserId, active: bool) -> Result<User> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_active = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE user_id = ?
        "#,
    )
    .bind(active)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(VibesiaError::not_found("User", id));
    }

    fetch_in(conn, id).await
}
