//! Test fixtures for station integration tests
//!
//! Provides a seeded catalog and a coordinator wired to failure-injecting
//! backend doubles, all driven by one manual clock.

use std::sync::Arc;

use radiyo_station::models::{Moderator, Playlist, QueueItem, Song, SongRequest};
use radiyo_station::repositories::{MemoryCatalog, MemoryPlaybackStore};
use radiyo_station::services::{ModerationService, NowPlayingCoordinator};
use radiyo_station::{Clock, ManualClock};

use super::mocks::{CountingLookup, FlakyPlaybackStore, FlakyRequestSink};

/// Clock value at the start of every test
pub const START: i64 = 1_700_000_000_000;

pub const PLAYLIST_ID: &str = "morning-show";

pub fn song(n: usize) -> Song {
    Song::new(
        format!("song-{n}"),
        format!("Track {n}"),
        format!("Artist {n}"),
        "Morning Sessions",
        180_000,
    )
}

/// A song outside the seeded playlist, identified by a letter
pub fn named_song(name: &str) -> Song {
    Song::new(name, format!("Song {name}"), "Various", "Singles", 200_000)
}

pub fn playlist() -> Playlist {
    Playlist::new(PLAYLIST_ID, "Morning Show").with_description("Weekday wake-up mix")
}

/// Songs 1 to 5 of the morning show, in playlist order
pub fn playlist_songs() -> Vec<Song> {
    (1..=5).map(song).collect()
}

pub fn request_item(n: usize) -> QueueItem {
    QueueItem::from_request(song(n), playlist(), format!("req-{n}"), START)
}

pub fn song_ids(queue: &[QueueItem]) -> Vec<String> {
    queue.iter().map(|item| item.song.id.clone()).collect()
}

/// Coordinator wired to in-memory doubles
pub struct TestStation {
    pub coordinator: Arc<NowPlayingCoordinator>,
    pub catalog: Arc<MemoryCatalog>,
    pub store: Arc<FlakyPlaybackStore>,
    pub lookup: Arc<CountingLookup>,
    pub requests: Arc<FlakyRequestSink>,
    pub clock: ManualClock,
}

impl TestStation {
    pub fn new() -> Self {
        let clock = ManualClock::new(START);
        let catalog = Arc::new(MemoryCatalog::with_clock(Arc::new(clock.clone())));
        catalog.insert_playlist(playlist(), playlist_songs());
        catalog.insert_moderator(Moderator {
            id: "mod-1".to_string(),
            name: "Dj Kim".to_string(),
        });

        let store = Arc::new(FlakyPlaybackStore::new(MemoryPlaybackStore::new(
            catalog.clone(),
            Arc::new(clock.clone()),
        )));
        let lookup = Arc::new(CountingLookup::new(catalog.clone()));
        let requests = Arc::new(FlakyRequestSink::new(catalog.clone()));

        let coordinator = Arc::new(NowPlayingCoordinator::new(
            store.clone(),
            lookup.clone(),
            catalog.clone(),
            Arc::new(clock.clone()),
        ));

        Self {
            coordinator,
            catalog,
            store,
            lookup,
            requests,
            clock,
        }
    }

    pub fn moderation(&self) -> ModerationService {
        ModerationService::new(
            self.coordinator.clone(),
            self.requests.clone(),
            self.lookup.clone(),
        )
    }

    /// Register a pending request with the catalog
    pub fn pending_request(
        &self,
        id: &str,
        song_title: &str,
        artist_name: Option<&str>,
    ) -> SongRequest {
        let request = SongRequest::pending(
            id,
            "listener-1",
            song_title,
            artist_name.map(str::to_string),
        );
        self.catalog.insert_request(request.clone());
        request
    }

    pub fn queue_ids(&self) -> Vec<String> {
        song_ids(&self.coordinator.queue().snapshot())
    }

    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }
}
