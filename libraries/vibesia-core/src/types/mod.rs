mod audit;
mod ids;
mod playlist;
mod song;
mod user;

pub use audit::{AuditAction, AuditContext, AuditLogEntry, AuditLogPage, AuditQuery};
pub use ids::{PlaylistId, SongId, UserId};
pub use playlist::{
    AddSong, CreatePlaylist, Pagination, Playlist, PlaylistEntry, PlaylistSong, PlaylistStatus,
    PlaylistSummary, PlaylistView, SongReorder, UpdatePlaylist,
};
pub use song::Song;
pub use user::{Actor, AdminPolicy, NewUser, Role, User, UserChanges};
