/// Shared application state
use crate::config::PlaylistSettings;
use crate::services::AuthService;
use std::sync::Arc;
use vibesia_core::AdminPolicy;
use vibesia_storage::Database;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub admin_policy: Arc<AdminPolicy>,
    pub playlists: PlaylistSettings,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        auth_service: Arc<AuthService>,
        admin_policy: Arc<AdminPolicy>,
        playlists: PlaylistSettings,
    ) -> Self {
        Self {
            db,
            auth_service,
            admin_policy,
            playlists,
        }
    }
}
