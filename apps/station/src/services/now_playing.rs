//! Now-playing coordinator
//!
//! Owns the queue and the single local now-playing state, and mediates
//! between them and the remote playback record. Every command follows the
//! same order: issue the backend call, then apply the local change
//! optimistically whether or not the call succeeded. A failed call is
//! logged, published on the error channel and reported through the
//! returned [`Outcome`]; nothing is rolled back and nothing is retried.
//!
//! Remote updates delivered by the subscription (see
//! [`RemoteSync`](super::RemoteSync)) overwrite the local state through
//! [`NowPlayingCoordinator::apply_remote`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument};

use super::queue::QueueEngine;
use super::Outcome;
use crate::clock::Clock;
use crate::error::{ErrorNotice, StoreError};
use crate::models::{
    NowPlayingState, PlaybackPatch, PlaybackRecordView, Playlist, QueueItem, Song, StateOrigin,
};
use crate::repositories::{CatalogReader, PlaybackRecordStore, PlaylistLookup, StationBackend};

/// Direction of a playlist-relative skip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Next,
    Previous,
}

impl SkipDirection {
    /// Index of the target song, wrapping around the playlist
    ///
    /// `current` is `None` when the playing song is no longer part of the
    /// playlist: next then starts from the top, previous from the bottom.
    /// An empty playlist has no target.
    pub fn target(self, current: Option<usize>, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        Some(match (self, current) {
            (Self::Next, Some(i)) if i < last => i + 1,
            (Self::Next, _) => 0,
            (Self::Previous, Some(i)) if i > 0 && i <= last => i - 1,
            (Self::Previous, _) => last,
        })
    }
}

/// Single source of truth for what is playing now
pub struct NowPlayingCoordinator {
    queue: QueueEngine,
    state: watch::Sender<NowPlayingState>,
    errors: watch::Sender<Option<ErrorNotice>>,
    store: Arc<dyn PlaybackRecordStore>,
    playlists: Arc<dyn PlaylistLookup>,
    catalog: Arc<dyn CatalogReader>,
    clock: Arc<dyn Clock>,
}

impl NowPlayingCoordinator {
    pub fn new(
        store: Arc<dyn PlaybackRecordStore>,
        playlists: Arc<dyn PlaylistLookup>,
        catalog: Arc<dyn CatalogReader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(NowPlayingState::default());
        let (errors, _) = watch::channel(None);
        Self {
            queue: QueueEngine::new(),
            state,
            errors,
            store,
            playlists,
            catalog,
            clock,
        }
    }

    pub fn from_backend(backend: &StationBackend, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            backend.store.clone(),
            backend.playlists.clone(),
            backend.catalog.clone(),
            clock,
        )
    }

    pub(super) fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    // Observables

    pub fn queue(&self) -> &QueueEngine {
        &self.queue
    }

    pub fn subscribe_queue(&self) -> watch::Receiver<Vec<QueueItem>> {
        self.queue.subscribe()
    }

    pub fn subscribe(&self) -> watch::Receiver<NowPlayingState> {
        self.state.subscribe()
    }

    pub fn now_playing(&self) -> NowPlayingState {
        self.state.borrow().clone()
    }

    /// Side channel carrying the most recent backend failure
    pub fn errors(&self) -> watch::Receiver<Option<ErrorNotice>> {
        self.errors.subscribe()
    }

    pub fn last_error(&self) -> Option<ErrorNotice> {
        self.errors.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.errors.send_if_modified(|notice| notice.take().is_some());
    }

    /// Log a backend failure and publish it on the error channel
    pub fn report(&self, operation: &'static str, error: &StoreError) {
        error.log(operation);
        self.errors
            .send_replace(Some(ErrorNotice::new(operation, error, self.clock.now_millis())));
    }

    // Queue commands

    pub fn add_to_queue_bottom(&self, item: QueueItem) {
        debug!(song_id = %item.song.id, is_from_request = item.is_from_request, "Queued at bottom");
        self.queue.push_back(item);
    }

    pub fn add_to_queue_top(&self, item: QueueItem) {
        debug!(song_id = %item.song.id, is_from_request = item.is_from_request, "Queued at top");
        self.queue.push_front(item);
    }

    /// Remove the queue item at `index`; stale indices are ignored
    pub fn remove_from_queue(&self, index: usize) -> Outcome {
        match self.queue.remove(index) {
            Some(item) => {
                debug!(index, song_id = %item.song.id, "Removed from queue");
                Outcome::Applied
            }
            None => {
                debug!(index, len = self.queue.len(), "Queue index out of range");
                Outcome::Noop
            }
        }
    }

    /// Empty the queue and reset the local state to idle
    pub fn clear_queue(&self) {
        self.queue.clear();
        self.state.send_replace(NowPlayingState::default());
        info!("Queue cleared");
    }

    // Playback commands

    /// Play `song` immediately and resync the queue from `playlist`
    #[instrument(skip(self, song, playlist), fields(song_id = %song.id, playlist_id = %playlist.id))]
    pub async fn play_song_now(
        &self,
        song: Song,
        playlist: Playlist,
        moderator_id: Option<&str>,
    ) -> Outcome {
        let written = self.start(&song, &playlist, moderator_id, "play_song_now").await;
        let populated = self.populate_queue_from_playlist(&song, &playlist).await;

        if written.is_applied() && populated != Outcome::Failed {
            Outcome::Applied
        } else {
            Outcome::LocalOnly
        }
    }

    /// Play the head of the queue; does nothing on an empty queue
    #[instrument(skip(self))]
    pub async fn play_next(&self, moderator_id: Option<&str>) -> Outcome {
        let Some(item) = self.queue.pop_front() else {
            debug!("Queue empty, nothing to play next");
            return Outcome::Noop;
        };

        self.start(&item.song, &item.playlist, moderator_id, "play_next")
            .await
    }

    /// Write the remote record, then switch the local state to playing
    async fn start(
        &self,
        song: &Song,
        playlist: &Playlist,
        moderator_id: Option<&str>,
        operation: &'static str,
    ) -> Outcome {
        let (started_at, outcome) = match self.store.write(song, playlist, moderator_id).await {
            Ok(record) => (record.started_at, Outcome::Applied),
            Err(e) => {
                self.report(operation, &e);
                (self.clock.now_millis(), Outcome::LocalOnly)
            }
        };

        self.state.send_replace(NowPlayingState::playing(
            song.clone(),
            playlist.clone(),
            moderator_id.map(str::to_string),
            started_at,
        ));
        info!(song_id = %song.id, title = %song.title, started_at, "Now playing");

        outcome
    }

    /// Resync the queue from the playlist position of `current`
    ///
    /// Request items survive, playlist continuation restarts right after
    /// `current`. The queue is left untouched when `current` is not part of
    /// the playlist or when the lookup fails.
    pub async fn populate_queue_from_playlist(&self, current: &Song, playlist: &Playlist) -> Outcome {
        let songs = match self.playlists.playlist_songs(&playlist.id).await {
            Ok(songs) => songs,
            Err(e) => {
                self.report("populate_queue_from_playlist", &e);
                return Outcome::Failed;
            }
        };

        if self.queue.resync(current, playlist, &songs, self.clock.now_millis()) {
            debug!(
                playlist_id = %playlist.id,
                queued = self.queue.len(),
                "Queue resynced from playlist"
            );
            Outcome::Applied
        } else {
            debug!(
                playlist_id = %playlist.id,
                song_id = %current.id,
                "Current song not in playlist, queue left as is"
            );
            Outcome::Noop
        }
    }

    #[instrument(skip(self))]
    pub async fn pause_playing(&self) -> Outcome {
        let now = self.clock.now_millis();
        let outcome = self.patch(PlaybackPatch::Pause { at: now }, "pause_playing").await;

        self.state.send_if_modified(|state| {
            if state.is_idle() {
                return false;
            }
            state.pause_at(now);
            true
        });
        info!(at = now, "Playback paused");

        outcome
    }

    #[instrument(skip(self))]
    pub async fn resume_playing(&self) -> Outcome {
        let now = self.clock.now_millis();
        let outcome = self.patch(PlaybackPatch::Resume { at: now }, "resume_playing").await;

        self.state.send_if_modified(|state| {
            if state.is_idle() {
                return false;
            }
            state.resume_at(now);
            true
        });
        info!(at = now, "Playback resumed");

        outcome
    }

    async fn patch(&self, patch: PlaybackPatch, operation: &'static str) -> Outcome {
        match self.store.patch(patch).await {
            Ok(Some(_)) => Outcome::Applied,
            Ok(None) => Outcome::Noop,
            Err(e) => {
                self.report(operation, &e);
                Outcome::LocalOnly
            }
        }
    }

    pub async fn skip_next(&self) -> Outcome {
        self.skip(SkipDirection::Next).await
    }

    pub async fn skip_previous(&self) -> Outcome {
        self.skip(SkipDirection::Previous).await
    }

    /// Move the remote record to the neighbouring song of its playlist
    #[instrument(skip(self))]
    async fn skip(&self, direction: SkipDirection) -> Outcome {
        let operation = match direction {
            SkipDirection::Next => "skip_next",
            SkipDirection::Previous => "skip_previous",
        };

        let record = match self.store.current().await {
            Ok(Some(record)) => record,
            Ok(None) => return Outcome::Noop,
            Err(e) => {
                self.report(operation, &e);
                return Outcome::Failed;
            }
        };
        let Some(playlist_id) = record.playlist_id.clone() else {
            return Outcome::Noop;
        };

        let songs = match self.playlists.playlist_songs(&playlist_id).await {
            Ok(songs) => songs,
            Err(e) => {
                self.report(operation, &e);
                return Outcome::Failed;
            }
        };

        let current = songs.iter().position(|song| song.id == record.song_id);
        let Some(index) = direction.target(current, songs.len()) else {
            return Outcome::Noop;
        };
        let target = songs[index].clone();

        let patch = PlaybackPatch::Skip {
            song_id: target.id.clone(),
            at: self.clock.now_millis(),
        };
        let (record, outcome) = match self.store.patch(patch.clone()).await {
            Ok(Some(patched)) => (patched, Outcome::Applied),
            Ok(None) => return Outcome::Noop,
            Err(e) => {
                self.report(operation, &e);
                let mut expected = record;
                expected.apply(&patch);
                (expected, Outcome::LocalOnly)
            }
        };

        let playlist = self.resolve_playlist(&playlist_id, operation).await;
        info!(song_id = %target.id, ?direction, "Skipped");
        self.state
            .send_replace(NowPlayingState::from_record(&record, target, playlist));

        outcome
    }

    /// Playlist of the local state when it matches, catalog lookup otherwise
    async fn resolve_playlist(&self, playlist_id: &str, operation: &'static str) -> Option<Playlist> {
        let local = self
            .state
            .borrow()
            .playlist
            .clone()
            .filter(|playlist| playlist.id == playlist_id);
        if local.is_some() {
            return local;
        }

        match self.catalog.playlist(playlist_id).await {
            Ok(playlist) => playlist,
            Err(e) => {
                e.log(operation);
                None
            }
        }
    }

    /// Delete the remote record and reset the local state to idle
    #[instrument(skip(self))]
    pub async fn clear_now_playing(&self) -> Outcome {
        let outcome = match self.store.delete().await {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                self.report("clear_now_playing", &e);
                Outcome::LocalOnly
            }
        };

        self.state.send_replace(NowPlayingState::default());
        info!("Now playing cleared");

        outcome
    }

    /// Start a fresh moderator session: empty queue, no record
    pub async fn reset_session(&self) -> Outcome {
        self.clear_queue();
        self.clear_now_playing().await
    }

    /// Overwrite the local state with the authoritative remote view
    pub fn apply_remote(&self, view: Option<PlaybackRecordView>) {
        let next = match &view {
            Some(view) => NowPlayingState::confirmed(view),
            None => NowPlayingState {
                origin: StateOrigin::Confirmed,
                ..NowPlayingState::default()
            },
        };

        let changed = self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });

        if changed {
            debug!(
                song_id = view.as_ref().map(|v| v.song.id.as_str()),
                "Applied remote playback record"
            );
        }
    }
}
