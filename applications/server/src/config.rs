/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vibesia_core::AdminPolicy;
use vibesia_storage::PoolSettings;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default)]
    pub admin: AdminSettings,

    #[serde(default = "default_playlists")]
    pub playlists: PlaylistSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds a writer waits for the database lock
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,

    #[serde(default = "default_jwt_refresh_expiration_days")]
    pub jwt_refresh_expiration_days: u64,

    /// bcrypt work factor for new password hashes
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

/// Who is an administrator
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminSettings {
    #[serde(default)]
    pub emails: Vec<String>,

    #[serde(default)]
    pub usernames: Vec<String>,

    #[serde(default)]
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistSettings {
    #[serde(default = "default_allow_reorder")]
    pub allow_reorder: bool,

    /// Upper bound applied to `limit` on listings
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl StorageSettings {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            busy_timeout: Duration::from_secs(self.busy_timeout_secs),
        }
    }
}

impl AdminSettings {
    pub fn policy(&self) -> AdminPolicy {
        AdminPolicy::new(
            &self.emails,
            self.usernames.iter().cloned(),
            self.user_ids.iter().copied(),
        )
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file, falling back to `config.toml`
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from("config.toml"), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(ServerError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        // Override with environment variables (prefixed with VIBESIA_)
        settings = settings.add_source(
            config::Environment::with_prefix("VIBESIA")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("admin.emails")
                .with_list_parse_key("admin.usernames")
                .with_list_parse_key("admin.user_ids")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set VIBESIA_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ServerError::Config(
                "auth.bcrypt_cost must be between 4 and 31".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ServerError::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        if self.playlists.max_page_size < 1 {
            return Err(ServerError::Config(
                "playlists.max_page_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        max_connections: default_max_connections(),
        busy_timeout_secs: default_busy_timeout_secs(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/vibesia.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout_secs() -> u64 {
    30
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        jwt_expiration_hours: default_jwt_expiration_hours(),
        jwt_refresh_expiration_days: default_jwt_refresh_expiration_days(),
        bcrypt_cost: default_bcrypt_cost(),
    }
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_jwt_refresh_expiration_days() -> u64 {
    30
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_playlists() -> PlaylistSettings {
    PlaylistSettings {
        allow_reorder: default_allow_reorder(),
        max_page_size: default_max_page_size(),
    }
}

fn default_allow_reorder() -> bool {
    true
}

fn default_max_page_size() -> i64 {
    500
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            admin: AdminSettings::default(),
            playlists: default_playlists(),
        }
    }
}
