use crate::{audit, playlists, songs, users, AuditedTransaction};
use async_trait::async_trait;
use sqlx::SqlitePool;
use vibesia_core::{error::Result, storage::CatalogStorage, types::*, VibesiaError};

/// Catalog storage backed by `SQLite`
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
    allow_reorder: bool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            allow_reorder: true,
        }
    }

    /// Enable or disable song reordering
    #[must_use]
    pub fn with_reorder(mut self, allow: bool) -> Self {
        self.allow_reorder = allow;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All users, oldest first
    pub async fn list_users(&self) -> Result<Vec<User>> {
        users::get_all(&self.pool).await
    }

    fn ensure_reorder_allowed(&self) -> Result<()> {
        if self.allow_reorder {
            Ok(())
        } else {
            Err(VibesiaError::UnsupportedOperation(
                "Reordering playlist songs is disabled".to_string(),
            ))
        }
    }
}

#[async_trait]
impl CatalogStorage for SqliteCatalog {
    // Playlists
    async fn list_playlists(
        &self,
        owner: UserId,
        page: Pagination,
    ) -> Result<Vec<PlaylistSummary>> {
        playlists::list(&self.pool, owner, page).await
    }

    async fn count_playlists(&self, owner: UserId) -> Result<i64> {
        playlists::count(&self.pool, owner).await
    }

    async fn get_playlist(&self, id: PlaylistId, owner: UserId) -> Result<PlaylistView> {
        playlists::get(&self.pool, id, owner).await
    }

    async fn create_playlist(
        &self,
        audit: &AuditContext,
        owner: UserId,
        playlist: CreatePlaylist,
    ) -> Result<PlaylistView> {
        playlists::create(&self.pool, audit, owner, playlist).await
    }

    async fn update_playlist(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        update: UpdatePlaylist,
    ) -> Result<PlaylistView> {
        if !update.reorder_songs.is_empty() {
            self.ensure_reorder_allowed()?;
        }
        playlists::update(&self.pool, audit, id, owner, update).await
    }

    async fn delete_playlist(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
    ) -> Result<Playlist> {
        playlists::delete(&self.pool, audit, id, owner).await
    }

    async fn add_song(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        song: AddSong,
    ) -> Result<PlaylistEntry> {
        playlists::add_song(&self.pool, audit, id, owner, song).await
    }

    async fn remove_song(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        song_id: SongId,
    ) -> Result<()> {
        playlists::remove_song(&self.pool, audit, id, owner, song_id).await
    }

    async fn reorder_song(
        &self,
        audit: &AuditContext,
        id: PlaylistId,
        owner: UserId,
        reorder: SongReorder,
    ) -> Result<PlaylistView> {
        self.ensure_reorder_allowed()?;
        playlists::reorder_song(&self.pool, audit, id, owner, reorder).await
    }

    // Catalog
    async fn get_song(&self, id: SongId) -> Result<Option<Song>> {
        songs::get_by_id(&self.pool, id).await
    }

    // Users
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        users::get_by_id(&self.pool, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        users::get_by_email(&self.pool, email).await
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        users::find_by_login(&self.pool, login).await
    }

    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>> {
        users::get_password_hash(&self.pool, id).await
    }

    async fn create_user(&self, audit: &AuditContext, user: NewUser) -> Result<User> {
        let mut tx = AuditedTransaction::begin(&self.pool, audit).await?;
        let outcome = users::create(tx.conn(), &user).await;
        tx.finish(outcome).await
    }

    async fn update_user(
        &self,
        audit: &AuditContext,
        id: UserId,
        changes: UserChanges,
    ) -> Result<User> {
        let mut tx = AuditedTransaction::begin(&self.pool, audit).await?;
        let outcome = users::update(tx.conn(), id, &changes).await;
        tx.finish(outcome).await
    }

    async fn delete_user(&self, audit: &AuditContext, id: UserId) -> Result<User> {
        let mut tx = AuditedTransaction::begin(&self.pool, audit).await?;
        let outcome = users::delete(tx.conn(), id).await;
        tx.finish(outcome).await
    }

    async fn set_user_active(
        &self,
        audit: &AuditContext,
        id: UserId,
        active: bool,
    ) -> Result<User> {
        let mut tx = AuditedTransaction::begin(&self.pool, audit).await?;
        let outcome = users::set_active(tx.conn(), id, active).await;
        tx.finish(outcome).await
    }

    // Audit
    async fn audit_log(&self, query: &AuditQuery) -> Result<AuditLogPage> {
        audit::list(&self.pool, query).await
    }
}
