//! Remote reconciliation task
//!
//! Drains the playback record subscription into the coordinator for the
//! lifetime of the session. A change that cannot be read is reported on the
//! error channel and the local state is kept. A dropped or failed
//! subscription is re-opened with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::task::JoinHandle;

use super::NowPlayingCoordinator;
use crate::error::StoreError;
use crate::repositories::PlaybackRecordStore;

const MAX_RECONNECT_DELAY_SECS: u64 = 60;
const MAX_RECONNECT_ATTEMPTS: u32 = 100;

pub struct RemoteSync {
    coordinator: Arc<NowPlayingCoordinator>,
    store: Arc<dyn PlaybackRecordStore>,
}

impl RemoteSync {
    pub fn new(coordinator: Arc<NowPlayingCoordinator>, store: Arc<dyn PlaybackRecordStore>) -> Self {
        Self { coordinator, store }
    }

    /// Start the task; abort the handle to end the subscription
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut attempts = 0u32;
        let mut delay_secs = 1u64;

        loop {
            match self.store.subscribe().await {
                Ok(mut stream) => {
                    tracing::debug!("Playback record subscription open");
                    attempts = 0;
                    delay_secs = 1;

                    while let Some(item) = stream.next().await {
                        match item {
                            Ok(view) => self.coordinator.apply_remote(view),
                            Err(e) => self.coordinator.report("subscribe", &e),
                        }
                    }
                    self.coordinator.report(
                        "subscribe",
                        &StoreError::Subscription("playback record stream ended".to_string()),
                    );
                    tracing::warn!("Playback record subscription ended, reconnecting...");
                }
                Err(e) => {
                    attempts += 1;
                    self.coordinator.report("subscribe", &e);
                    if attempts >= MAX_RECONNECT_ATTEMPTS {
                        tracing::error!(
                            "Playback record max reconnect attempts ({}) exceeded, giving up",
                            MAX_RECONNECT_ATTEMPTS
                        );
                        break;
                    }
                    tracing::warn!(
                        attempt = attempts,
                        delay_secs = delay_secs,
                        "Playback record subscription failed, reconnecting..."
                    );
                }
            }

            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            delay_secs = (delay_secs * 2).min(MAX_RECONNECT_DELAY_SECS);
        }
    }
}
