//! Moderator decisions on listener requests
//!
//! Approving a request persists the decision first, then looks the
//! requested song up in the playlist that is currently on air and hands it
//! to the admission policy. Rejecting only persists the decision.
//!
//! The playlist comes from the now-playing state, so an approval while the
//! station is idle is recorded but admits nothing.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::{Admission, NowPlayingCoordinator, Outcome};
use crate::models::{RequestDecision, SongRequest, UserIdentity};
use crate::repositories::{PlaylistLookup, RequestStatusSink, StationBackend};

/// Result of approving a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Nothing was playing, the request started immediately
    Played(Outcome),
    /// Queued at the top, behind the current track
    Queued(Outcome),
    /// Approved, but no song of the current playlist matches
    NoMatch,
    /// Approved, but there is no current playlist to pick the song from
    NoPlaylist,
    /// The playlist lookup failed, the request was not admitted
    Failed,
}

pub struct ModerationService {
    coordinator: Arc<NowPlayingCoordinator>,
    requests: Arc<dyn RequestStatusSink>,
    playlists: Arc<dyn PlaylistLookup>,
}

impl ModerationService {
    pub fn new(
        coordinator: Arc<NowPlayingCoordinator>,
        requests: Arc<dyn RequestStatusSink>,
        playlists: Arc<dyn PlaylistLookup>,
    ) -> Self {
        Self {
            coordinator,
            requests,
            playlists,
        }
    }

    pub fn from_backend(coordinator: Arc<NowPlayingCoordinator>, backend: &StationBackend) -> Self {
        Self::new(
            coordinator,
            backend.requests.clone(),
            backend.playlists.clone(),
        )
    }

    #[instrument(skip(self, request, moderator), fields(request_id = %request.id))]
    pub async fn approve_request(
        &self,
        request: &SongRequest,
        moderator: Option<&UserIdentity>,
    ) -> ApprovalOutcome {
        // A failed status write does not hold the song back
        match self
            .requests
            .submit_status(&request.id, RequestDecision::Approved)
            .await
        {
            Ok(()) => info!(title = %request.song_title, "Request approved"),
            Err(e) => self.coordinator.report("approve_request", &e),
        }

        let Some(playlist) = self.coordinator.now_playing().playlist else {
            debug!("No current playlist, request approved without playback");
            return ApprovalOutcome::NoPlaylist;
        };

        let songs = match self.playlists.playlist_songs(&playlist.id).await {
            Ok(songs) => songs,
            Err(e) => {
                self.coordinator.report("approve_request", &e);
                return ApprovalOutcome::Failed;
            }
        };

        let artist = request
            .artist_name
            .as_deref()
            .filter(|artist| !artist.trim().is_empty());
        let Some(song) = songs
            .into_iter()
            .find(|song| song.matches_request(&request.song_title, artist))
        else {
            debug!(playlist_id = %playlist.id, "No playlist song matches the request");
            return ApprovalOutcome::NoMatch;
        };

        let moderator_id = moderator.map(|user| user.id.as_str());
        match self
            .coordinator
            .play_or_queue_request(song, playlist, request.id.clone(), moderator_id)
            .await
        {
            (Admission::PlayNow, outcome) => ApprovalOutcome::Played(outcome),
            (Admission::QueueNext, outcome) => ApprovalOutcome::Queued(outcome),
        }
    }

    #[instrument(skip(self))]
    pub async fn reject_request(&self, request_id: &str) -> Outcome {
        match self
            .requests
            .submit_status(request_id, RequestDecision::Rejected)
            .await
        {
            Ok(()) => {
                info!("Request rejected");
                Outcome::Applied
            }
            Err(e) => {
                self.coordinator.report("reject_request", &e);
                Outcome::Failed
            }
        }
    }
}
