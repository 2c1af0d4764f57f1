//! Backend collaborators of the station
//!
//! The core only talks to the backend through the traits defined here:
//! - [`PlaybackRecordStore`] for the singleton now-playing record
//! - [`PlaylistLookup`] for ordered playlist contents
//! - [`CatalogReader`] for resolving record references for display
//! - [`RequestStatusSink`] for persisting moderator decisions
//!
//! Two implementations are provided: an in-memory backend for single
//! instance mode and tests, and a Redis backend whose pub/sub channel
//! drives the record subscription.

pub mod backend;
pub mod memory;
pub mod redis_store;

pub use self::backend::StationBackend;
pub use self::memory::{MemoryCatalog, MemoryPlaybackStore};
pub use self::redis_store::{RedisCatalog, RedisKeys, RedisPlaybackStore};

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::StoreResult;
use crate::models::{
    Moderator, PlaybackPatch, PlaybackRecord, PlaybackRecordView, Playlist, RequestDecision, Song,
};

/// Push-based stream of the resolved playback record
///
/// Yields the current value first, then one item per change. `None` means
/// there is no record (or its song no longer resolves). A change that
/// cannot be read or resolved is delivered as an `Err` item and the stream
/// goes on.
pub type PlaybackRecordStream = BoxStream<'static, StoreResult<Option<PlaybackRecordView>>>;

/// Durable store of the singleton playback record
#[async_trait]
pub trait PlaybackRecordStore: Send + Sync {
    /// Subscribe to the record
    async fn subscribe(&self) -> StoreResult<PlaybackRecordStream>;

    /// Read the raw record
    async fn current(&self) -> StoreResult<Option<PlaybackRecord>>;

    /// Upsert the record for a song that starts now
    ///
    /// Exactly one record exists after the call. Returns the written record
    /// so that callers can reuse its `started_at`.
    async fn write(
        &self,
        song: &Song,
        playlist: &Playlist,
        moderator_id: Option<&str>,
    ) -> StoreResult<PlaybackRecord>;

    /// Patch the existing record; a missing record is left missing
    async fn patch(&self, patch: PlaybackPatch) -> StoreResult<Option<PlaybackRecord>>;

    /// Delete the record
    async fn delete(&self) -> StoreResult<()>;
}

/// Ordered playlist contents
#[async_trait]
pub trait PlaylistLookup: Send + Sync {
    async fn playlist_songs(&self, playlist_id: &str) -> StoreResult<Vec<Song>>;
}

/// Point lookups used to resolve a playback record for display
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn song(&self, song_id: &str) -> StoreResult<Option<Song>>;

    async fn playlist(&self, playlist_id: &str) -> StoreResult<Option<Playlist>>;

    async fn moderator(&self, user_id: &str) -> StoreResult<Option<Moderator>>;
}

/// Mutation channel for request status changes
#[async_trait]
pub trait RequestStatusSink: Send + Sync {
    async fn submit_status(&self, request_id: &str, decision: RequestDecision) -> StoreResult<()>;
}

/// Resolve a raw record into its display view
///
/// A dangling song reference yields `None`; dangling playlist or moderator
/// references are dropped from the view.
pub async fn resolve_record(
    catalog: &dyn CatalogReader,
    record: Option<PlaybackRecord>,
) -> StoreResult<Option<PlaybackRecordView>> {
    let Some(record) = record else {
        return Ok(None);
    };

    let Some(song) = catalog.song(&record.song_id).await? else {
        tracing::debug!(song_id = %record.song_id, "Playback record song no longer exists");
        return Ok(None);
    };

    let playlist = match &record.playlist_id {
        Some(id) => catalog.playlist(id).await?,
        None => None,
    };

    let moderator = match &record.moderator_id {
        Some(id) => catalog.moderator(id).await?,
        None => None,
    };

    Ok(Some(PlaybackRecordView::new(
        &record, song, playlist, moderator,
    )))
}
