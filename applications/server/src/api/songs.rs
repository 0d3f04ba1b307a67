/// Song API routes
use crate::{error::Result, middleware::RequestContext, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use vibesia_core::{CatalogStorage, Song, SongId, VibesiaError};

/// GET /api/v1/songs/:id
///
/// Public: anonymous callers are served too.
pub async fn get_song(
    State(app_state): State<AppState>,
    context: RequestContext,
    Path(id): Path<SongId>,
) -> Result<Json<Song>> {
    tracing::debug!(
        song_id = %id,
        user_id = %context.audit.app_user_id(),
        "Song requested"
    );

    let song = app_state
        .db
        .get_song(id)
        .await?
        .ok_or_else(|| VibesiaError::not_found("Song", id))?;

    Ok(Json(song))
}
