//! Catalog values: songs and playlists
//!
//! Both are immutable references owned by the backend. The station never
//! edits them, it only carries them around in queue items and in the
//! now-playing state.

use serde::{Deserialize, Serialize};

/// A song as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Backend-assigned song identifier
    #[serde(rename = "_id")]
    pub id: String,

    pub title: String,

    pub artist: String,

    pub album: String,

    /// Track length in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
}

impl Song {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration_ms,
        }
    }

    /// Check whether this song satisfies a listener request
    ///
    /// Titles are compared case-insensitively. When the request names an
    /// artist, the artist must match as well (also case-insensitively).
    pub fn matches_request(&self, song_title: &str, artist_name: Option<&str>) -> bool {
        let title_matches = self.title.trim().to_lowercase() == song_title.trim().to_lowercase();
        let artist_matches = artist_name
            .map(|artist| self.artist.trim().to_lowercase() == artist.trim().to_lowercase())
            .unwrap_or(true);
        title_matches && artist_matches
    }
}

/// A moderator-curated playlist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
