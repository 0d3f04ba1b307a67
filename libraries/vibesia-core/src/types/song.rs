//! Song types (read-only from the playlist side)

use super::ids::SongId;
use serde::{Deserialize, Serialize};

/// A song with its album and artist names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub album_id: i64,
    pub title: String,
    /// Seconds
    pub duration: i64,
    pub track_number: Option<i32>,
    pub composer: Option<String>,
    pub explicit_content: bool,
    pub album_title: Option<String>, // Denormalized
    pub artist_name: Option<String>, // Denormalized
}
