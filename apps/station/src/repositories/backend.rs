//! Backend selection
//!
//! Bundles the four collaborator handles the station needs. The Redis
//! backend is used when Redis answers a PING, otherwise the station runs in
//! single instance mode on the in-memory backend.

use std::sync::Arc;

use super::{
    CatalogReader, MemoryCatalog, MemoryPlaybackStore, PlaybackRecordStore, PlaylistLookup,
    RedisCatalog, RedisKeys, RedisPlaybackStore, RequestStatusSink,
};
use crate::clock::Clock;
use crate::config::{BackendMode, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Redis,
    InMemory,
}

/// Collaborator handles shared by the coordinator and the moderation flow
#[derive(Clone)]
pub struct StationBackend {
    pub store: Arc<dyn PlaybackRecordStore>,
    pub playlists: Arc<dyn PlaylistLookup>,
    pub catalog: Arc<dyn CatalogReader>,
    pub requests: Arc<dyn RequestStatusSink>,
    kind: BackendKind,
}

impl StationBackend {
    /// Create an in-memory backend over the given catalog
    pub fn in_memory(catalog: Arc<MemoryCatalog>, clock: Arc<dyn Clock>) -> Self {
        let store = MemoryPlaybackStore::new(catalog.clone(), clock);
        Self {
            store: Arc::new(store),
            playlists: catalog.clone(),
            catalog: catalog.clone(),
            requests: catalog,
            kind: BackendKind::InMemory,
        }
    }

    /// Create a Redis backend from an already opened client
    pub fn with_redis(client: redis::Client, keys: RedisKeys, clock: Arc<dyn Clock>) -> Self {
        let catalog = Arc::new(RedisCatalog::new(client.clone(), keys.clone(), clock.clone()));
        let store = RedisPlaybackStore::new(client, keys, catalog.clone(), clock);
        Self {
            store: Arc::new(store),
            playlists: catalog.clone(),
            catalog: catalog.clone(),
            requests: catalog,
            kind: BackendKind::Redis,
        }
    }

    /// Try to create with Redis, fall back to in-memory
    pub async fn try_with_redis(config: &Config, clock: Arc<dyn Clock>) -> Self {
        if config.backend == BackendMode::Memory {
            tracing::info!("In-memory backend selected by configuration");
            return Self::in_memory(Arc::new(MemoryCatalog::with_clock(clock.clone())), clock);
        }

        match redis::Client::open(config.redis_url()) {
            Ok(client) => {
                // Test connection
                let connect = tokio::time::timeout(
                    std::time::Duration::from_secs(config.common.redis.connect_timeout_secs),
                    client.get_multiplexed_async_connection(),
                );
                match connect.await {
                    Ok(Ok(mut conn)) => {
                        let pong: Result<String, _> =
                            redis::cmd("PING").query_async(&mut conn).await;
                        if pong.is_ok() {
                            tracing::info!(prefix = %config.key_prefix, "Redis backend connected");
                            return Self::with_redis(
                                client,
                                RedisKeys::new(config.key_prefix.clone()),
                                clock,
                            );
                        }
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Redis backend connection failed");
                    }
                    Err(_) => {
                        tracing::warn!(
                            timeout_secs = config.common.redis.connect_timeout_secs,
                            "Redis backend connection timed out"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis client creation failed");
            }
        }

        tracing::warn!("Using in-memory backend (single instance mode only)");
        Self::in_memory(Arc::new(MemoryCatalog::with_clock(clock.clone())), clock)
    }

    /// Check if we're using Redis (multi-instance capable)
    pub fn is_redis_backed(&self) -> bool {
        matches!(self.kind, BackendKind::Redis)
    }
}
