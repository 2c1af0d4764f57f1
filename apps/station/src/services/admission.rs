//! Request admission policy
//!
//! An approved listener request plays immediately when the station is idle.
//! Otherwise it goes to the top of the queue, right after the current
//! track and ahead of playlist continuation.

use tracing::info;

use super::{NowPlayingCoordinator, Outcome};
use crate::models::{NowPlayingState, Playlist, QueueItem, Song};

/// Where an approved request enters the play sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    PlayNow,
    QueueNext,
}

impl Admission {
    pub fn for_state(state: &NowPlayingState) -> Self {
        if state.is_idle() {
            Self::PlayNow
        } else {
            Self::QueueNext
        }
    }
}

impl NowPlayingCoordinator {
    /// Play an approved request now, or queue it next
    pub async fn play_or_queue_request(
        &self,
        song: Song,
        playlist: Playlist,
        request_id: impl Into<String>,
        moderator_id: Option<&str>,
    ) -> (Admission, Outcome) {
        let request_id = request_id.into();
        let admission = Admission::for_state(&self.now_playing());
        info!(%request_id, song_id = %song.id, ?admission, "Admitting request");

        let outcome = match admission {
            Admission::PlayNow => self.play_song_now(song, playlist, moderator_id).await,
            Admission::QueueNext => {
                let item =
                    QueueItem::from_request(song, playlist, request_id, self.now_millis());
                self.add_to_queue_top(item);
                Outcome::Applied
            }
        };

        (admission, outcome)
    }
}
