//! In-memory backend for single-instance mode
//!
//! The playback record lives in a `watch` channel, which gives the
//! subscription its "current value first, then every change" semantics for
//! free. The catalog is a set of concurrent maps so that tests and seeding
//! code can populate it through a shared reference.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::{
    resolve_record, CatalogReader, PlaybackRecordStore, PlaybackRecordStream, PlaylistLookup,
    RequestStatusSink,
};
use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Moderator, PlaybackPatch, PlaybackRecord, Playlist, RequestDecision, RequestStatus, Song,
    SongRequest,
};

/// In-memory catalog of songs, playlists, moderators and requests
pub struct MemoryCatalog {
    songs: DashMap<String, Song>,
    playlists: DashMap<String, Playlist>,
    /// Ordered song ids per playlist
    playlist_songs: DashMap<String, Vec<String>>,
    moderators: DashMap<String, Moderator>,
    requests: DashMap<String, SongRequest>,
    /// Stamps `processed_at` of moderated requests
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            songs: DashMap::new(),
            playlists: DashMap::new(),
            playlist_songs: DashMap::new(),
            moderators: DashMap::new(),
            requests: DashMap::new(),
            clock,
        }
    }

    pub fn insert_song(&self, song: Song) {
        self.songs.insert(song.id.clone(), song);
    }

    /// Insert a playlist with its ordered songs, replacing any previous
    /// contents
    pub fn insert_playlist(&self, playlist: Playlist, songs: Vec<Song>) {
        let ids = songs.iter().map(|song| song.id.clone()).collect();
        for song in songs {
            self.insert_song(song);
        }
        self.playlist_songs.insert(playlist.id.clone(), ids);
        self.playlists.insert(playlist.id.clone(), playlist);
    }

    pub fn insert_moderator(&self, moderator: Moderator) {
        self.moderators.insert(moderator.id.clone(), moderator);
    }

    pub fn insert_request(&self, request: SongRequest) {
        self.requests.insert(request.id.clone(), request);
    }

    pub fn remove_song(&self, song_id: &str) {
        self.songs.remove(song_id);
    }

    pub fn request_status(&self, request_id: &str) -> Option<RequestStatus> {
        self.requests.get(request_id).map(|request| request.status)
    }

    pub fn request(&self, request_id: &str) -> Option<SongRequest> {
        self.requests.get(request_id).map(|request| request.clone())
    }
}

#[async_trait]
impl PlaylistLookup for MemoryCatalog {
    async fn playlist_songs(&self, playlist_id: &str) -> StoreResult<Vec<Song>> {
        let ids = self
            .playlist_songs
            .get(playlist_id)
            .map(|ids| ids.clone())
            .ok_or_else(|| StoreError::not_found("playlist", playlist_id))?;

        Ok(ids
            .iter()
            .filter_map(|id| self.songs.get(id).map(|song| song.clone()))
            .collect())
    }
}

#[async_trait]
impl CatalogReader for MemoryCatalog {
    async fn song(&self, song_id: &str) -> StoreResult<Option<Song>> {
        Ok(self.songs.get(song_id).map(|song| song.clone()))
    }

    async fn playlist(&self, playlist_id: &str) -> StoreResult<Option<Playlist>> {
        Ok(self.playlists.get(playlist_id).map(|p| p.clone()))
    }

    async fn moderator(&self, user_id: &str) -> StoreResult<Option<Moderator>> {
        Ok(self.moderators.get(user_id).map(|m| m.clone()))
    }
}

#[async_trait]
impl RequestStatusSink for MemoryCatalog {
    async fn submit_status(&self, request_id: &str, decision: RequestDecision) -> StoreResult<()> {
        let mut request = self
            .requests
            .get_mut(request_id)
            .ok_or_else(|| StoreError::not_found("song request", request_id))?;

        request.status = decision.into();
        request.processed_at = Some(self.clock.now_millis());
        Ok(())
    }
}

/// In-memory playback record store
pub struct MemoryPlaybackStore {
    record: watch::Sender<Option<PlaybackRecord>>,
    catalog: Arc<dyn CatalogReader>,
    clock: Arc<dyn Clock>,
}

impl MemoryPlaybackStore {
    pub fn new(catalog: Arc<dyn CatalogReader>, clock: Arc<dyn Clock>) -> Self {
        let (record, _) = watch::channel(None);
        Self {
            record,
            catalog,
            clock,
        }
    }
}

#[async_trait]
impl PlaybackRecordStore for MemoryPlaybackStore {
    async fn subscribe(&self) -> StoreResult<PlaybackRecordStream> {
        let catalog = self.catalog.clone();

        let stream = WatchStream::new(self.record.subscribe())
            .then(move |record| {
                let catalog = catalog.clone();
                async move { resolve_record(catalog.as_ref(), record).await }
            })
            .boxed();

        Ok(stream)
    }

    async fn current(&self) -> StoreResult<Option<PlaybackRecord>> {
        Ok(self.record.borrow().clone())
    }

    async fn write(
        &self,
        song: &Song,
        playlist: &Playlist,
        moderator_id: Option<&str>,
    ) -> StoreResult<PlaybackRecord> {
        let record = PlaybackRecord::started(
            song.id.clone(),
            Some(playlist.id.clone()),
            moderator_id.map(str::to_string),
            self.clock.now_millis(),
        );
        self.record.send_replace(Some(record.clone()));
        Ok(record)
    }

    async fn patch(&self, patch: PlaybackPatch) -> StoreResult<Option<PlaybackRecord>> {
        let mut patched = None;
        self.record.send_if_modified(|current| match current {
            Some(record) => {
                record.apply(&patch);
                patched = Some(record.clone());
                true
            }
            None => false,
        });
        Ok(patched)
    }

    async fn delete(&self) -> StoreResult<()> {
        self.record.send_if_modified(|current| current.take().is_some());
        Ok(())
    }
}
