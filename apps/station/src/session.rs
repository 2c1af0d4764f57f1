//! Moderator session
//!
//! The session is the top-level owner of the station services: it builds
//! the coordinator and the moderation flow over a backend, optionally
//! starts from a clean slate and runs the remote reconciliation task until
//! the session ends.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::repositories::StationBackend;
use crate::services::{ModerationService, NowPlayingCoordinator, RemoteSync};

pub struct StationSession {
    backend: StationBackend,
    coordinator: Arc<NowPlayingCoordinator>,
    moderation: ModerationService,
    sync: Option<JoinHandle<()>>,
}

impl StationSession {
    /// Build the services and start reconciling with the backend
    ///
    /// With `reset_on_start` the queue and the playback record are cleared
    /// before the subscription opens, so the first remote update is the
    /// reset record.
    pub async fn start(backend: StationBackend, clock: Arc<dyn Clock>, reset_on_start: bool) -> Self {
        let coordinator = Arc::new(NowPlayingCoordinator::from_backend(&backend, clock));

        if reset_on_start {
            coordinator.reset_session().await;
        }

        let sync = RemoteSync::new(coordinator.clone(), backend.store.clone()).spawn();
        let moderation = ModerationService::from_backend(coordinator.clone(), &backend);

        tracing::info!(
            redis = backend.is_redis_backed(),
            reset_on_start,
            "Station session started"
        );

        Self {
            backend,
            coordinator,
            moderation,
            sync: Some(sync),
        }
    }

    pub fn coordinator(&self) -> &Arc<NowPlayingCoordinator> {
        &self.coordinator
    }

    pub fn moderation(&self) -> &ModerationService {
        &self.moderation
    }

    pub fn backend(&self) -> &StationBackend {
        &self.backend
    }

    /// Stop the reconciliation task and wait for it to finish
    pub async fn shutdown(mut self) {
        if let Some(sync) = self.sync.take() {
            sync.abort();
            // Cancellation is the expected way for the task to end
            let _ = sync.await;
        }
        tracing::info!("Station session ended");
    }
}

impl Drop for StationSession {
    fn drop(&mut self) {
        if let Some(sync) = self.sync.take() {
            sync.abort();
        }
    }
}
