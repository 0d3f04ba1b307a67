//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use vibesia_core::{AdminPolicy, AuditContext, CatalogStorage, SongId, User};
use vibesia_server::{api, config::PlaylistSettings, services::AuthService, state::AppState};
use vibesia_storage::{users::NewUser, PoolSettings, SqliteCatalog};

pub const TEST_SECRET: &str = "test-secret-key";
pub const ADMIN_EMAIL: &str = "admin@vibesia.com";

/// Router plus handles on everything behind it
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub catalog: Arc<SqliteCatalog>,
    pub auth_service: Arc<AuthService>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_playlist_settings(PlaylistSettings {
            allow_reorder: true,
            max_page_size: 500,
        })
        .await
    }

    /// Test app backed by a fresh SQLite file
    pub async fn with_playlist_settings(playlists: PlaylistSettings) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

        let pool = vibesia_storage::create_pool(&db_url, &PoolSettings::default())
            .await
            .unwrap();
        vibesia_storage::run_migrations(&pool).await.unwrap();

        let catalog = Arc::new(SqliteCatalog::new(pool).with_reorder(playlists.allow_reorder));
        let auth_service = Arc::new(AuthService::new(TEST_SECRET.to_string(), 1, 1).with_bcrypt_cost(4));
        let admin_policy = Arc::new(AdminPolicy::new([ADMIN_EMAIL], Vec::<String>::new(), []));

        let app_state = AppState::new(
            Arc::clone(&catalog),
            Arc::clone(&auth_service),
            admin_policy,
            playlists,
        );

        Self {
            router: api::router(app_state.clone()),
            state: app_state,
            catalog,
            auth_service,
            _temp_dir: temp_dir,
        }
    }

    /// Create a user with a cheap bcrypt hash
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> User {
        let password_hash = bcrypt::hash(password, 4).unwrap();
        self.catalog
            .create_user(
                &AuditContext::system("tests"),
                NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                },
            )
            .await
            .unwrap()
    }

    /// Access token for `user`
    pub fn token_for(&self, user: &User) -> String {
        self.auth_service.create_access_token(&user.email).unwrap()
    }

    /// Insert one artist and album and `durations.len()` songs
    pub async fn create_songs(&self, durations: &[i64]) -> Vec<SongId> {
        let pool = self.catalog.pool();
        let artist_id = sqlx::query("INSERT INTO artists (name) VALUES ('Test Artist')")
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid();
        let album_id = sqlx::query("INSERT INTO albums (artist_id, title) VALUES (?, 'Test Album')")
            .bind(artist_id)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid();

        let mut ids = Vec::new();
        for (i, duration) in durations.iter().enumerate() {
            let id = sqlx::query(
                "INSERT INTO songs (album_id, title, duration, audio_path) VALUES (?, ?, ?, ?)",
            )
            .bind(album_id)
            .bind(format!("Song {}", i + 1))
            .bind(duration)
            .bind(format!("/music/{i}.mp3"))
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid();
            ids.push(SongId::new(id));
        }
        ids
    }

    /// Send a request and return status plus parsed JSON body (`Null` if empty)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    /// Send a request and return the raw response
    pub async fn send_raw(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

/// Request builder with optional bearer token and JSON body
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
