//! Core station services
//!
//! - [`QueueEngine`]: the ordered upcoming-play queue
//! - [`NowPlayingCoordinator`]: current-track transitions and the bridge to
//!   the remote playback record
//! - [`Admission`]: where an approved request enters the play sequence
//! - [`ModerationService`]: approve/reject flow for listener requests
//! - [`RemoteSync`]: applies remote record updates to the coordinator

pub mod admission;
pub mod moderation;
pub mod now_playing;
pub mod queue;
pub mod sync;

pub use admission::Admission;
pub use moderation::{ApprovalOutcome, ModerationService};
pub use now_playing::{NowPlayingCoordinator, SkipDirection};
pub use queue::QueueEngine;
pub use sync::RemoteSync;

/// Result of a station command
///
/// Commands never fail outright: backend failures are recovered locally and
/// published on the coordinator's error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command took effect and the backend acknowledged it
    Applied,
    /// There was nothing to do
    Noop,
    /// The local change took effect but the backend call failed
    LocalOnly,
    /// A backend read failed, nothing was changed
    Failed,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
