/// API route modules
pub mod admin;
pub mod auth;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod users;

use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router under `/api/v1`
pub fn router(app_state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        // Users
        .route("/users", post(users::register))
        .route(
            "/users/me",
            get(users::me)
                .put(users::update_me)
                .delete(users::delete_me),
        )
        // Catalog
        .route("/songs/:id", get(songs::get_song))
        // Playlists
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route("/playlists/info/count", get(playlists::count_playlists))
        .route(
            "/playlists/:id",
            get(playlists::get_playlist)
                .put(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route("/playlists/:id/songs", post(playlists::add_song))
        .route(
            "/playlists/:id/songs/:song_id",
            axum::routing::delete(playlists::remove_song),
        )
        .route(
            "/playlists/:id/songs/:song_id/position",
            put(playlists::reorder_song),
        )
        // Admin
        .route("/admin/audit", get(admin::audit_log))
        .route("/admin/users/:id", get(admin::get_user))
        .route("/admin/users/:id/deactivate", put(admin::deactivate_user))
        .route("/admin/users/:id/reactivate", put(admin::reactivate_user));

    Router::new()
        .nest("/api/v1", routes)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(app_state)
}
