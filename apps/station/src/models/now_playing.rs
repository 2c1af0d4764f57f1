//! Local now-playing state
//!
//! There is exactly one now-playing state per coordinator. It is updated
//! optimistically by local commands (an *intent*) and overwritten whenever
//! the backend subscription delivers the authoritative record (a
//! *confirmed* state).

use serde::{Deserialize, Serialize};

use super::playback_record::{PlaybackRecord, PlaybackRecordView};
use super::song::{Playlist, Song};

/// Where the current state came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateOrigin {
    /// Set by a local command, not yet echoed by the backend
    #[default]
    Intent,
    /// Delivered by the backend subscription
    Confirmed,
}

/// Coarse playback phase derived from the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingState {
    /// Current song, `None` when nothing is playing
    pub song: Option<Song>,

    pub playlist: Option<Playlist>,

    pub moderator_id: Option<String>,

    pub is_playing: bool,

    /// Epoch ms at which the current song (virtually) started
    pub started_at: i64,

    /// Epoch ms at which playback was paused
    pub paused_at: Option<i64>,

    pub origin: StateOrigin,
}

impl NowPlayingState {
    /// Optimistic state for a song that just started
    pub fn playing(
        song: Song,
        playlist: Playlist,
        moderator_id: Option<String>,
        started_at: i64,
    ) -> Self {
        Self {
            song: Some(song),
            playlist: Some(playlist),
            moderator_id,
            is_playing: true,
            started_at,
            paused_at: None,
            origin: StateOrigin::Intent,
        }
    }

    /// State mirrored from the backend record
    pub fn confirmed(view: &PlaybackRecordView) -> Self {
        Self {
            song: Some(view.song.clone()),
            playlist: view.playlist.clone(),
            moderator_id: view.moderator.as_ref().map(|m| m.id.clone()),
            is_playing: view.is_playing,
            started_at: view.started_at,
            paused_at: if view.is_playing { None } else { view.paused_at },
            origin: StateOrigin::Confirmed,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.song.is_none()
    }

    pub fn phase(&self) -> PlaybackPhase {
        match (&self.song, self.is_playing) {
            (None, _) => PlaybackPhase::Idle,
            (Some(_), true) => PlaybackPhase::Playing,
            (Some(_), false) => PlaybackPhase::Paused,
        }
    }

    /// Mark the state paused at `now`
    ///
    /// Pausing an already paused state keeps the original pause instant.
    pub fn pause_at(&mut self, now: i64) {
        self.is_playing = false;
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
        self.origin = StateOrigin::Intent;
    }

    /// Mark the state playing again at `now`, excluding the pause interval
    /// from the playback position
    pub fn resume_at(&mut self, now: i64) {
        if let Some(paused_at) = self.paused_at.take() {
            self.started_at += (now - paused_at).max(0);
        }
        self.is_playing = true;
        self.origin = StateOrigin::Intent;
    }

    /// Optimistic state mirroring a record this instance just patched
    ///
    /// `song` and `playlist` are the resolved references of the record.
    pub fn from_record(record: &PlaybackRecord, song: Song, playlist: Option<Playlist>) -> Self {
        Self {
            song: Some(song),
            playlist,
            moderator_id: record.moderator_id.clone(),
            is_playing: record.is_playing,
            started_at: record.started_at,
            paused_at: if record.is_playing { None } else { record.paused_at },
            origin: StateOrigin::Intent,
        }
    }

    /// Playback position in milliseconds at `now`
    ///
    /// Frozen at the pause instant while paused, clamped to the song
    /// duration when the duration is known.
    pub fn elapsed_ms(&self, now: i64) -> u64 {
        let Some(song) = &self.song else {
            return 0;
        };

        let reference = match (self.is_playing, self.paused_at) {
            (false, Some(paused_at)) => paused_at,
            _ => now,
        };
        let elapsed = (reference - self.started_at).max(0) as u64;

        if song.duration_ms > 0 {
            elapsed.min(song.duration_ms)
        } else {
            elapsed
        }
    }

    /// Time left for the current song at `now`
    pub fn remaining_ms(&self, now: i64) -> u64 {
        self.song
            .as_ref()
            .map(|song| song.duration_ms.saturating_sub(self.elapsed_ms(now)))
            .unwrap_or(0)
    }
}
