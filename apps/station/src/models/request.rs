//! Listener song requests
//!
//! Requests are submitted by listeners as free text (title and optional
//! artist) and wait for a moderator decision. The station only ever moves
//! a request to `approved` or `rejected`; see [`RequestDecision`].

use serde::{Deserialize, Serialize};

/// Lifecycle status of a song request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Played,
}

/// A moderator decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDecision {
    Approved,
    Rejected,
}

impl From<RequestDecision> for RequestStatus {
    fn from(decision: RequestDecision) -> Self {
        match decision {
            RequestDecision::Approved => Self::Approved,
            RequestDecision::Rejected => Self::Rejected,
        }
    }
}

impl std::fmt::Display for RequestDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A listener-submitted song suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    #[serde(rename = "_id")]
    pub id: String,

    /// Listener who submitted the request
    pub user_id: String,

    pub song_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,

    #[serde(default)]
    pub status: RequestStatus,

    /// When a moderator processed the request (epoch ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<i64>,
}

impl SongRequest {
    pub fn pending(
        id: impl Into<String>,
        user_id: impl Into<String>,
        song_title: impl Into<String>,
        artist_name: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            song_title: song_title.into(),
            artist_name,
            status: RequestStatus::Pending,
            processed_at: None,
        }
    }
}
