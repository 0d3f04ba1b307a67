//! Playlist types

use super::ids::{PlaylistId, SongId, UserId};
use crate::error::VibesiaError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Playlist visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistStatus {
    #[default]
    Private,
    Public,
    Shared,
}

impl PlaylistStatus {
    /// Convert status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistStatus::Private => "private",
            PlaylistStatus::Public => "public",
            PlaylistStatus::Shared => "shared",
        }
    }
}

impl FromStr for PlaylistStatus {
    type Err = VibesiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(PlaylistStatus::Private),
            "public" => Ok(PlaylistStatus::Public),
            "shared" => Ok(PlaylistStatus::Shared),
            other => Err(VibesiaError::invalid(
                "status",
                format!("Status must be one of: private, public, shared (got '{other}')"),
            )),
        }
    }
}

impl fmt::Display for PlaylistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playlist row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub status: PlaylistStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Song entry of a playlist, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub playlist_id: PlaylistId,
    pub song_id: SongId,
    /// 1-based position
    pub position: i64,
    pub date_added: DateTime<Utc>,
}

/// Song in a playlist with denormalized track data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSong {
    pub song_id: SongId,
    pub position: i64,
    pub date_added: DateTime<Utc>,
    pub title: String,
    /// Seconds
    pub duration: i64,
    pub track_number: Option<i32>,
    pub album_id: i64,
    pub album_title: Option<String>,
    pub artist_name: Option<String>,
}

/// Materialized playlist: songs in position order plus aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistView {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub songs: Vec<PlaylistSong>,
    pub song_count: i64,
    /// Sum of song durations in seconds
    pub total_duration: i64,
}

impl PlaylistView {
    /// Song ids in position order
    pub fn song_ids(&self) -> Vec<SongId> {
        self.songs.iter().map(|s| s.song_id).collect()
    }

    /// Positions in order
    pub fn positions(&self) -> Vec<i64> {
        self.songs.iter().map(|s| s.position).collect()
    }
}

/// Lightweight listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub song_count: i64,
    pub total_duration: i64,
}

/// Data for creating a new playlist
///
/// `song_ids` seeds the playlist; their order becomes positions 1, 2, 3, ...
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreatePlaylist {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 300))]
    pub description: Option<String>,
    #[serde(default)]
    pub status: PlaylistStatus,
    #[serde(default)]
    pub song_ids: Vec<SongId>,
}

/// Data for adding one song
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct AddSong {
    pub song_id: SongId,
    /// Insertion point; appends when omitted
    #[validate(range(min = 1))]
    pub position: Option<i64>,
}

impl AddSong {
    pub fn append(song_id: SongId) -> Self {
        Self {
            song_id,
            position: None,
        }
    }
}

/// Move one song to a new 1-based position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct SongReorder {
    pub song_id: SongId,
    #[validate(range(min = 1))]
    pub new_position: i64,
}

/// Data for updating a playlist
///
/// Metadata changes and song list operations are applied in one transaction,
/// in the order: metadata, additions, removals, reorders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlaylist {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 300))]
    pub description: Option<String>,
    pub status: Option<PlaylistStatus>,
    #[serde(default)]
    #[validate(nested)]
    pub add_songs: Vec<AddSong>,
    #[serde(default)]
    pub remove_songs: Vec<SongId>,
    #[serde(default)]
    #[validate(nested)]
    pub reorder_songs: Vec<SongReorder>,
}

impl UpdatePlaylist {
    /// Whether any of the playlist row's own columns change
    pub fn touches_metadata(&self) -> bool {
        self.name.is_some() || self.description.is_some() || self.status.is_some()
    }
}

/// Offset pagination for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Pagination {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 500))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_conversion() {
        assert_eq!(PlaylistStatus::Public.as_str(), "public");
        assert_eq!(
            "shared".parse::<PlaylistStatus>().unwrap(),
            PlaylistStatus::Shared
        );
        assert!("secret".parse::<PlaylistStatus>().is_err());
    }

    #[test]
    fn status_defaults_to_private() {
        let create: CreatePlaylist = serde_json::from_str(r#"{"name": "Road trip"}"#).unwrap();
        assert_eq!(create.status, PlaylistStatus::Private);
        assert!(create.song_ids.is_empty());
    }

    #[test]
    fn invalid_status_is_rejected_by_deserialization() {
        let result = serde_json::from_str::<CreatePlaylist>(r#"{"name": "x", "status": "secret"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_validation_bounds_name() {
        let empty = CreatePlaylist {
            name: String::new(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let long = CreatePlaylist {
            name: "x".repeat(101),
            ..Default::default()
        };
        assert!(long.validate().is_err());

        let ok = CreatePlaylist {
            name: "Focus".to_string(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn update_validation_checks_nested_positions() {
        let update = UpdatePlaylist {
            reorder_songs: vec![SongReorder {
                song_id: SongId::new(1),
                new_position: 0,
            }],
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn view_serializes_flat() {
        let view = PlaylistView {
            playlist: Playlist {
                id: PlaylistId::new(1),
                owner_id: UserId::new(2),
                name: "Mix".to_string(),
                description: None,
                status: PlaylistStatus::Private,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            songs: vec![],
            song_count: 0,
            total_duration: 0,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["status"], "private");
        assert_eq!(json["total_duration"], 0);
    }
}
