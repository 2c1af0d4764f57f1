//! Domain models for the station
//!
//! This module contains:
//! - Catalog values (songs, playlists) owned by the backend
//! - Queue items and the local now-playing state
//! - The persisted playback record and its patches
//! - Listener song requests and user identities

pub mod now_playing;
pub mod playback_record;
pub mod queue;
pub mod request;
pub mod song;
pub mod user;

pub use now_playing::{NowPlayingState, PlaybackPhase, StateOrigin};
pub use playback_record::{PlaybackPatch, PlaybackRecord, PlaybackRecordView};
pub use queue::QueueItem;
pub use request::{RequestDecision, RequestStatus, SongRequest};
pub use song::{Playlist, Song};
pub use user::{Moderator, UserIdentity, UserRole};
