//! Radiyo station library
//!
//! This crate holds the playback queue and now-playing coordinator for a
//! moderated radio station: listeners' approved requests are merged with
//! the moderator's playlist into a single queue, and a single shared
//! "now playing" record is kept in sync with the remote backend.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorNotice, ErrorSeverity, StoreError, StoreResult};
pub use repositories::StationBackend;
pub use services::{ModerationService, NowPlayingCoordinator, Outcome, QueueEngine};
pub use session::StationSession;
