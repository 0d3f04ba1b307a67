//! Storage trait for the catalog and playlists

use crate::error::Result;
use crate::types::{
    AddSong, AuditContext, AuditLogPage, AuditQuery, CreatePlaylist, NewUser, Pagination,
    Playlist, PlaylistEntry, PlaylistId, PlaylistSummary, PlaylistView, Song, SongId,
    SongReorder, UpdatePlaylist, User, UserChanges, UserId,
};
use async_trait::async_trait;

/// Storage operations used by the server
///
/// Every playlist operation is owner-scoped: a playlist belonging to another
/// user is reported as `NotFound`. Mutations take the request's
/// [`AuditContext`] and run as one transaction each.
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    // ========================================================================
    // Playlists
    // ========================================================================

    /// Owner's playlists with song count and total duration
    async fn list_playlists(&self, owner: UserId, page: Pagination)
        -> Result<Vec<PlaylistSummary>>;

    /// Number of playlists owned by `owner`
    async fn count_playlists(&self, owner: UserId) -> Result<i64>;

    /// Materialized playlist
    async fn get_playlist(&self, id: PlaylistId, owner: UserId) -> Result<PlaylistView>;

    /// Create a playlist and seed its songs in order
    async fn create_playlist(
        &self,
        audit: &AuditContext,
        owner: UserId,
        playlist: CreatePlaylist,
    ) -> Result<PlaylistView>;

    /// Update metadata and apply song list operations
    async fn update_playlist(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        update: UpdatePlaylist,
    ) -> Result<PlaylistView>;

    /// Delete a playlist and its entries, returning the deleted row
    async fn delete_playlist(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
    ) -> Result<Playlist>;

    /// Add one song
    async fn add_song(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        song: AddSong,
    ) -> Result<PlaylistEntry>;

    /// Remove one song; other positions are left as they are
    async fn remove_song(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        song_id: SongId,
    ) -> Result<()>;

    /// Move one song and renumber the playlist
    async fn reorder_song(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        reorder: SongReorder,
    ) -> Result<PlaylistView>;

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Get song by ID
    async fn get_song(&self, id: SongId) -> Result<Option<Song>>;

    // ========================================================================
    // Users
    // ========================================================================

    /// Get user by ID
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Find user by email (token subject)
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find user by email or username (login)
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>>;

    /// Stored bcrypt hash
    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>>;

    /// Register an account; username and email must both be free
    async fn create_user(&self, audit: &AuditContext, user: NewUser) -> Result<User>;

    /// Change username, email or password
    async fn update_user(
        &self,
        audit: &AuditContext,
        id: UserId,
        changes: UserChanges,
    ) -> Result<User>;

    /// Permanently delete an account along with its playlists
    async fn delete_user(&self, audit: &AuditContext, id: UserId) -> Result<User>;

    /// Activate or deactivate an account
    async fn set_user_active(&self, audit: &AuditContext, id: UserId, active: bool)
        -> Result<User>;

    // ========================================================================
    // Audit
    // ========================================================================

    /// Page through the audit trail
    async fn audit_log(&self, query: &AuditQuery) -> Result<AuditLogPage>;
}
