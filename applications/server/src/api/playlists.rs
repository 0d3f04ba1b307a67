/// Playlists API routes
///
/// Every route requires an authenticated owner. Playlists of other users are
/// reported as not found.
use crate::{
    error::Result,
    middleware::{CurrentUser, ValidatedJson, ValidatedQuery},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;
use vibesia_core::{
    AddSong, CatalogStorage, CreatePlaylist, Pagination, Playlist, PlaylistEntry, PlaylistId,
    PlaylistSummary, PlaylistView, SongId, SongReorder, UpdatePlaylist,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderRequest {
    #[validate(range(min = 1))]
    pub new_position: i64,
}

/// GET /api/v1/playlists?skip&limit
pub async fn list_playlists(
    State(app_state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(mut page): ValidatedQuery<Pagination>,
) -> Result<Json<Vec<PlaylistSummary>>> {
    page.limit = page.limit.min(app_state.playlists.max_page_size);

    let playlists = app_state.db.list_playlists(current.user.id, page).await?;
    Ok(Json(playlists))
}

/// GET /api/v1/playlists/info/count
pub async fn count_playlists(
    State(app_state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<i64>> {
    let count = app_state.db.count_playlists(current.user.id).await?;
    Ok(Json(count))
}

/// POST /api/v1/playlists
/// Create a playlist, seeding `song_ids` in order
pub async fn create_playlist(
    State(app_state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreatePlaylist>,
) -> Result<(StatusCode, Json<PlaylistView>)> {
    let view = app_state
        .db
        .create_playlist(&current.audit, current.user.id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/playlists/:id
pub async fn get_playlist(
    State(app_state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<PlaylistId>,
) -> Result<Json<PlaylistView>> {
    let view = app_state.db.get_playlist(id, current.user.id).await?;
    Ok(Json(view))
}

/// PUT /api/v1/playlists/:id
/// Update metadata and apply `add_songs`, `remove_songs`, `reorder_songs`
pub async fn update_playlist(
    State(app_state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<PlaylistId>,
    ValidatedJson(req): ValidatedJson<UpdatePlaylist>,
) -> Result<Json<PlaylistView>> {
    let view = app_state
        .db
        .update_playlist(&current.audit, id, current.user.id, req)
        .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/playlists/:id
/// Returns the deleted playlist
pub async fn delete_playlist(
    State(app_state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<PlaylistId>,
) -> Result<Json<Playlist>> {
    let deleted = app_state
        .db
        .delete_playlist(&current.audit, id, current.user.id)
        .await?;
    Ok(Json(deleted))
}

/// POST /api/v1/playlists/:id/songs
pub async fn add_song(
    State(app_state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<PlaylistId>,
    ValidatedJson(req): ValidatedJson<AddSong>,
) -> Result<(StatusCode, Json<PlaylistEntry>)> {
    let entry = app_state
        .db
        .add_song(&current.audit, id, current.user.id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/v1/playlists/:id/songs/:song_id
pub async fn remove_song(
    State(app_state): State<AppState>,
    current: CurrentUser,
    Path((id, song_id)): Path<(PlaylistId, SongId)>,
) -> Result<StatusCode> {
    app_state
        .db
        .remove_song(&current.audit, id, current.user.id, song_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/playlists/:id/songs/:song_id/position
pub async fn reorder_song(
    State(app_state): State<AppState>,
    current: CurrentUser,
    Path((id, song_id)): Path<(PlaylistId, SongId)>,
    ValidatedJson(req): ValidatedJson<ReorderRequest>,
) -> Result<Json<PlaylistView>> {
    let view = app_state
        .db
        .reorder_song(
            &current.audit,
            id,
            current.user.id,
            SongReorder {
                song_id,
                new_position: req.new_position,
            },
        )
        .await?;
    Ok(Json(view))
}
