//! Vibesia Core
//!
//! Domain types, the storage trait and error handling shared by the
//! Vibesia storage layer and server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Playlist`, `PlaylistView`, `Song`, `User`, `AuditContext`
//! - **Storage Trait**: `CatalogStorage`, implemented by `vibesia-storage`
//! - **Error Handling**: Unified `VibesiaError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use vibesia_core::types::{Actor, AdminPolicy, AuditContext, Role, User, UserId};
//!
//! let policy = AdminPolicy::new(["admin@vibesia.com"], ["admin"], [1]);
//! let user = User {
//!     id: UserId::new(7),
//!     username: "alice".to_string(),
//!     email: "alice@example.com".to_string(),
//!     is_active: true,
//!     created_at: chrono::Utc::now(),
//! };
//!
//! let actor = Actor::resolve(&user, &policy);
//! assert_eq!(actor.role, Role::User);
//!
//! let context = AuditContext::anonymous().with_actor(actor);
//! assert_eq!(context.app_user_id(), "7");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{FailureCode, FieldError, Result, VibesiaError};
pub use storage::CatalogStorage;

pub use types::{
    // Identity and audit
    Actor, AdminPolicy, AuditAction, AuditContext, AuditLogEntry, AuditLogPage, AuditQuery,
    NewUser, Role, User, UserChanges,
    // Catalog
    Song,
    // Playlists
    AddSong, CreatePlaylist, Pagination, Playlist, PlaylistEntry, PlaylistSong, PlaylistStatus,
    PlaylistSummary, PlaylistView, SongReorder, UpdatePlaylist,
    // Identifiers
    PlaylistId, SongId, UserId,
};
