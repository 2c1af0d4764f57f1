//! Persisted playback record
//!
//! The backend keeps exactly one playback record per deployment. It is the
//! durable counterpart of the local [`NowPlayingState`](super::NowPlayingState):
//! created on the first write, mutated in place afterwards and deleted only
//! by an explicit clear.
//!
//! The mutation rules live here so that every store implementation applies
//! them identically:
//!
//! - a write sets `started_at = now`, `is_playing = true` and drops `paused_at`
//! - a pause freezes the position by recording `paused_at` (a second pause
//!   keeps the first `paused_at`)
//! - a resume shifts `started_at` forward by the pause duration, so the
//!   elapsed position is the same as when the pause began

use serde::{Deserialize, Serialize};

use super::song::{Playlist, Song};
use super::user::Moderator;

/// The singleton playback row as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRecord {
    pub song_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_id: Option<String>,

    /// Epoch ms at which the current song (virtually) started
    pub started_at: i64,

    #[serde(default = "default_is_playing")]
    pub is_playing: bool,

    /// Epoch ms at which playback was paused, present only while paused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<i64>,
}

fn default_is_playing() -> bool {
    true
}

/// Partial update applied to an existing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PlaybackPatch {
    Pause { at: i64 },
    Resume { at: i64 },
    /// Jump to another song of the same playlist, keeping the play state
    Skip { song_id: String, at: i64 },
}

impl PlaybackRecord {
    /// Build the record written when a song starts playing
    pub fn started(
        song_id: impl Into<String>,
        playlist_id: Option<String>,
        moderator_id: Option<String>,
        now: i64,
    ) -> Self {
        Self {
            song_id: song_id.into(),
            playlist_id,
            moderator_id,
            started_at: now,
            is_playing: true,
            paused_at: None,
        }
    }

    /// Apply a patch in place
    pub fn apply(&mut self, patch: &PlaybackPatch) {
        match patch {
            PlaybackPatch::Pause { at } => {
                self.is_playing = false;
                if self.paused_at.is_none() {
                    self.paused_at = Some(*at);
                }
            }
            PlaybackPatch::Resume { at } => {
                let paused_at = self.paused_at.take().unwrap_or(*at);
                self.started_at += (*at - paused_at).max(0);
                self.is_playing = true;
            }
            PlaybackPatch::Skip { song_id, at } => {
                self.song_id = song_id.clone();
                self.started_at = *at;
                if !self.is_playing {
                    self.paused_at = Some(*at);
                }
            }
        }
    }
}

/// The playback record with its references resolved for display
///
/// This is what a subscription delivers. A record whose song can no longer
/// be resolved is delivered as `None`, the same as a missing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRecordView {
    pub song: Song,

    pub playlist: Option<Playlist>,

    pub moderator: Option<Moderator>,

    pub started_at: i64,

    pub is_playing: bool,

    pub paused_at: Option<i64>,
}

impl PlaybackRecordView {
    pub fn new(
        record: &PlaybackRecord,
        song: Song,
        playlist: Option<Playlist>,
        moderator: Option<Moderator>,
    ) -> Self {
        Self {
            song,
            playlist,
            moderator,
            started_at: record.started_at,
            is_playing: record.is_playing,
            paused_at: record.paused_at,
        }
    }
}
