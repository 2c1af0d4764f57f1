//! Queue item model
//!
//! A queue item is created when a song is scheduled after the current
//! track, either as playlist continuation or as an approved listener
//! request, and is destroyed when it is played or removed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::song::{Playlist, Song};

/// A single entry of the upcoming-play queue
///
/// Every item gets its own `id`, so two items never share identity even
/// when they carry the same song and playlist (a song may queue twice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Unique queue item identifier
    pub id: Uuid,

    pub song: Song,

    /// Playlist the song is played from
    pub playlist: Playlist,

    /// Whether this item came from an approved listener request
    pub is_from_request: bool,

    /// Originating request record, kept for traceability
    pub request_id: Option<String>,

    /// Epoch ms at which this item was added to the queue
    pub added_at: i64,
}

impl QueueItem {
    pub fn new(
        song: Song,
        playlist: Playlist,
        is_from_request: bool,
        request_id: Option<String>,
        added_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            song,
            playlist,
            is_from_request,
            request_id,
            added_at,
        }
    }

    /// Playlist continuation item
    pub fn from_playlist(song: Song, playlist: Playlist, added_at: i64) -> Self {
        Self::new(song, playlist, false, None, added_at)
    }

    /// Approved listener request
    pub fn from_request(
        song: Song,
        playlist: Playlist,
        request_id: impl Into<String>,
        added_at: i64,
    ) -> Self {
        Self::new(song, playlist, true, Some(request_id.into()), added_at)
    }
}
