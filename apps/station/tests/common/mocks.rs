//! Backend doubles for station integration tests
//!
//! Each double wraps the in-memory backend, counts the calls it receives and
//! can be switched into a failing mode to simulate a transient backend
//! outage.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use radiyo_station::models::{
    Moderator, PlaybackPatch, PlaybackRecord, Playlist, RequestDecision, Song,
};
use radiyo_station::repositories::{
    CatalogReader, MemoryCatalog, MemoryPlaybackStore, PlaybackRecordStore, PlaybackRecordStream,
    PlaylistLookup, RequestStatusSink,
};
use radiyo_station::{StoreError, StoreResult};

fn injected() -> StoreError {
    StoreError::Unavailable("injected failure".to_string())
}

/// Playback store that records calls and fails on demand
pub struct FlakyPlaybackStore {
    inner: MemoryPlaybackStore,
    failing: AtomicBool,
    writes: AtomicUsize,
    patches: AtomicUsize,
    deletes: AtomicUsize,
}

impl FlakyPlaybackStore {
    pub fn new(inner: MemoryPlaybackStore) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
            patches: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of write calls, failed ones included
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn patches(&self) -> usize {
        self.patches.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Read the record, bypassing failure injection
    pub async fn record(&self) -> Option<PlaybackRecord> {
        self.inner.current().await.ok().flatten()
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(injected())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlaybackRecordStore for FlakyPlaybackStore {
    async fn subscribe(&self) -> StoreResult<PlaybackRecordStream> {
        self.check()?;
        self.inner.subscribe().await
    }

    async fn current(&self) -> StoreResult<Option<PlaybackRecord>> {
        self.check()?;
        self.inner.current().await
    }

    async fn write(
        &self,
        song: &Song,
        playlist: &Playlist,
        moderator_id: Option<&str>,
    ) -> StoreResult<PlaybackRecord> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.write(song, playlist, moderator_id).await
    }

    async fn patch(&self, patch: PlaybackPatch) -> StoreResult<Option<PlaybackRecord>> {
        self.patches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.patch(patch).await
    }

    async fn delete(&self) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.delete().await
    }
}

/// Playlist lookup that counts calls and fails on demand
pub struct CountingLookup {
    catalog: Arc<MemoryCatalog>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl CountingLookup {
    pub fn new(catalog: Arc<MemoryCatalog>) -> Self {
        Self {
            catalog,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistLookup for CountingLookup {
    async fn playlist_songs(&self, playlist_id: &str) -> StoreResult<Vec<Song>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.catalog.playlist_songs(playlist_id).await
    }
}

/// Catalog reader whose song lookups fail on demand
pub struct FlakyCatalogReader {
    catalog: Arc<MemoryCatalog>,
    failing: AtomicBool,
}

impl FlakyCatalogReader {
    pub fn new(catalog: Arc<MemoryCatalog>) -> Self {
        Self {
            catalog,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogReader for FlakyCatalogReader {
    async fn song(&self, song_id: &str) -> StoreResult<Option<Song>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.catalog.song(song_id).await
    }

    async fn playlist(&self, playlist_id: &str) -> StoreResult<Option<Playlist>> {
        self.catalog.playlist(playlist_id).await
    }

    async fn moderator(&self, user_id: &str) -> StoreResult<Option<Moderator>> {
        self.catalog.moderator(user_id).await
    }
}

/// Request status sink that fails on demand
pub struct FlakyRequestSink {
    catalog: Arc<MemoryCatalog>,
    failing: AtomicBool,
}

impl FlakyRequestSink {
    pub fn new(catalog: Arc<MemoryCatalog>) -> Self {
        Self {
            catalog,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RequestStatusSink for FlakyRequestSink {
    async fn submit_status(&self, request_id: &str, decision: RequestDecision) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.catalog.submit_status(request_id, decision).await
    }
}
