//! Integration tests for user accounts
//!
//! Tests registration, profile changes, activation and deletion, each in
//! its own audited transaction.

mod test_helpers;

use test_helpers::*;
use vibesia_core::{types::*, CatalogStorage, VibesiaError};

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "hash".to_string(),
    }
}

#[tokio::test]
async fn test_create_user_rejects_taken_email_ignoring_case() {
    let test_db = TestDb::new().await;
    let catalog = test_db.catalog();
    let ctx = AuditContext::anonymous();

    catalog.create_user(&ctx, new_user("dana")).await.unwrap();

    let result = catalog
        .create_user(
            &ctx,
            NewUser {
                username: "dana2".to_string(),
                email: "DANA@example.com".to_string(),
                password_hash: "hash".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(VibesiaError::DuplicateEntry { .. })));
    assert_eq!(count_rows(test_db.pool(), "users").await, 1);
}

#[tokio::test]
async fn test_update_user_changes_only_given_fields() {
    let test_db = TestDb::new().await;
    let catalog = test_db.catalog();
    let ctx = AuditContext::anonymous();
    let user = catalog.create_user(&ctx, new_user("erin")).await.unwrap();

    let updated = catalog
        .update_user(
            &ctx,
            user.id,
            UserChanges {
                email: Some("erin@music.example".to_string()),
                password_hash: Some("new-hash".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.username, "erin");
    assert_eq!(updated.email, "erin@music.example");
    assert_eq!(updated.created_at, user.created_at);
    assert_eq!(
        catalog.get_password_hash(user.id).await.unwrap().as_deref(),
        Some("new-hash")
    );
}

#[tokio::test]
async fn test_update_user_rejects_name_of_another_account() {
    let test_db = TestDb::new().await;
    let catalog = test_db.catalog();
    let ctx = AuditContext::anonymous();
    let erin = catalog.create_user(&ctx, new_user("erin")).await.unwrap();
    catalog.create_user(&ctx, new_user("finn")).await.unwrap();

    let result = catalog
        .update_user(
            &ctx,
            erin.id,
            UserChanges {
                username: Some("finn".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(VibesiaError::DuplicateEntry { .. })));

    // Keeping one's own name is not a conflict
    let same = catalog
        .update_user(
            &ctx,
            erin.id,
            UserChanges {
                username: Some("erin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.username, "erin");
}

#[tokio::test]
async fn test_delete_user_cascades_playlists() {
    let test_db = TestDb::new().await;
    let catalog = test_db.catalog();
    let owner = create_test_user(test_db.pool(), "gale").await;
    let songs = create_test_songs(test_db.pool(), 2).await;
    let ctx = user_context(owner, "gale@example.com");

    catalog
        .create_playlist(
            &ctx,
            owner,
            CreatePlaylist {
                name: "Mine".to_string(),
                song_ids: songs,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let deleted = catalog.delete_user(&ctx, owner).await.unwrap();
    assert_eq!(deleted.username, "gale");

    assert_eq!(count_rows(test_db.pool(), "playlists").await, 0);
    assert_eq!(count_rows(test_db.pool(), "playlist_songs").await, 0);
    assert!(catalog.get_user(owner).await.unwrap().is_none());

    let again = catalog.delete_user(&ctx, owner).await;
    assert!(matches!(again, Err(VibesiaError::NotFound { .. })));
}

#[tokio::test]
async fn test_set_user_active_round_trip() {
    let test_db = TestDb::new().await;
    let catalog = test_db.catalog();
    let ctx = AuditContext::system("tests");
    let user = catalog.create_user(&ctx, new_user("hale")).await.unwrap();

    let inactive = catalog.set_user_active(&ctx, user.id, false).await.unwrap();
    assert!(!inactive.is_active);

    let active = catalog.set_user_active(&ctx, user.id, true).await.unwrap();
    assert!(active.is_active);

    let missing = catalog.set_user_active(&ctx, UserId::new(999), true).await;
    assert!(matches!(missing, Err(VibesiaError::NotFound { .. })));
}

#[tokio::test]
async fn test_timestamps_decode_as_utc() {
    let test_db = TestDb::new().await;
    let catalog = test_db.catalog();
    let before = chrono::Utc::now() - chrono::Duration::seconds(5);

    let user = catalog
        .create_user(&AuditContext::anonymous(), new_user("ivy"))
        .await
        .unwrap();

    assert!(user.created_at >= before);
    assert!(user.created_at <= chrono::Utc::now());
}
