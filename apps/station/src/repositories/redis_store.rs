//! Redis backend for multi-instance deployments
//!
//! The playback record is stored as JSON under a single key. Every mutation
//! is followed by a PUBLISH of the new record (or `null` after a delete) on
//! the change channel, and subscriptions are driven by that channel.
//!
//! Catalog layout, all keys under the configured prefix:
//!
//! | Key                          | Type   | Content                    |
//! |------------------------------|--------|----------------------------|
//! | `{prefix}:now_playing`       | string | playback record JSON       |
//! | `{prefix}:song:{id}`         | string | song JSON                  |
//! | `{prefix}:playlist:{id}`     | string | playlist JSON              |
//! | `{prefix}:playlist:{id}:songs` | list | ordered song ids           |
//! | `{prefix}:user:{id}`         | string | user identity JSON         |
//! | `{prefix}:request:{id}`      | hash   | song request fields        |

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{future, stream, StreamExt};

use super::{
    resolve_record, CatalogReader, PlaybackRecordStore, PlaybackRecordStream, PlaylistLookup,
    RequestStatusSink,
};
use crate::clock::Clock;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Moderator, PlaybackPatch, PlaybackRecord, Playlist, RequestDecision, Song, UserIdentity,
};

/// Key naming scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisKeys {
    prefix: String,
}

impl RedisKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn record(&self) -> String {
        format!("{}:now_playing", self.prefix)
    }

    pub fn channel(&self) -> String {
        format!("{}:now_playing:changes", self.prefix)
    }

    pub fn song(&self, song_id: &str) -> String {
        format!("{}:song:{}", self.prefix, song_id)
    }

    pub fn playlist(&self, playlist_id: &str) -> String {
        format!("{}:playlist:{}", self.prefix, playlist_id)
    }

    pub fn playlist_songs(&self, playlist_id: &str) -> String {
        format!("{}:playlist:{}:songs", self.prefix, playlist_id)
    }

    pub fn user(&self, user_id: &str) -> String {
        format!("{}:user:{}", self.prefix, user_id)
    }

    pub fn request(&self, request_id: &str) -> String {
        format!("{}:request:{}", self.prefix, request_id)
    }
}

/// Catalog reads and request status writes against Redis
#[derive(Clone)]
pub struct RedisCatalog {
    client: redis::Client,
    keys: RedisKeys,
    clock: Arc<dyn Clock>,
}

impl RedisCatalog {
    pub fn new(client: redis::Client, keys: RedisKeys, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            keys,
            clock,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl PlaylistLookup for RedisCatalog {
    #[tracing::instrument(skip(self))]
    async fn playlist_songs(&self, playlist_id: &str) -> StoreResult<Vec<Song>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let exists: bool = redis::cmd("EXISTS")
            .arg(self.keys.playlist(playlist_id))
            .query_async(&mut conn)
            .await?;
        if !exists {
            return Err(StoreError::not_found("playlist", playlist_id));
        }

        let ids: Vec<String> = redis::cmd("LRANGE")
            .arg(self.keys.playlist_songs(playlist_id))
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let song_keys: Vec<String> = ids.iter().map(|id| self.keys.song(id)).collect();
        let raw: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&song_keys)
            .query_async(&mut conn)
            .await?;

        // Dangling ids are skipped, the order of the list is kept
        raw.into_iter()
            .flatten()
            .map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl CatalogReader for RedisCatalog {
    async fn song(&self, song_id: &str) -> StoreResult<Option<Song>> {
        self.get_json(&self.keys.song(song_id)).await
    }

    async fn playlist(&self, playlist_id: &str) -> StoreResult<Option<Playlist>> {
        self.get_json(&self.keys.playlist(playlist_id)).await
    }

    async fn moderator(&self, user_id: &str) -> StoreResult<Option<Moderator>> {
        let user: Option<UserIdentity> = self.get_json(&self.keys.user(user_id)).await?;
        Ok(user.as_ref().map(Moderator::from))
    }
}

#[async_trait]
impl RequestStatusSink for RedisCatalog {
    #[tracing::instrument(skip(self))]
    async fn submit_status(&self, request_id: &str, decision: RequestDecision) -> StoreResult<()> {
        let key = self.keys.request(request_id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let exists: bool = redis::cmd("EXISTS")
            .arg(&key)
            .query_async(&mut conn)
            .await?;
        if !exists {
            return Err(StoreError::not_found("song request", request_id));
        }

        let _: () = redis::cmd("HSET")
            .arg(&key)
            .arg("status")
            .arg(decision.to_string())
            .arg("processedAt")
            .arg(self.clock.now_millis())
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}

/// Playback record store backed by a Redis key and pub/sub channel
pub struct RedisPlaybackStore {
    client: redis::Client,
    keys: RedisKeys,
    catalog: Arc<dyn CatalogReader>,
    clock: Arc<dyn Clock>,
}

impl RedisPlaybackStore {
    pub fn new(
        client: redis::Client,
        keys: RedisKeys,
        catalog: Arc<dyn CatalogReader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            keys,
            catalog,
            clock,
        }
    }

    /// Store the record and announce it on the change channel
    async fn store_and_publish(&self, record: Option<&PlaybackRecord>) -> StoreResult<()> {
        let payload = serde_json::to_string(&record)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        match record {
            Some(_) => {
                let _: () = redis::cmd("SET")
                    .arg(self.keys.record())
                    .arg(&payload)
                    .query_async(&mut conn)
                    .await?;
            }
            None => {
                let _: () = redis::cmd("DEL")
                    .arg(self.keys.record())
                    .query_async(&mut conn)
                    .await?;
            }
        }

        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(self.keys.channel())
            .arg(&payload)
            .query_async(&mut conn)
            .await?;
        tracing::trace!(receivers, "Published playback record change");

        Ok(())
    }
}

#[async_trait]
impl PlaybackRecordStore for RedisPlaybackStore {
    #[tracing::instrument(skip(self))]
    async fn subscribe(&self) -> StoreResult<PlaybackRecordStream> {
        // Subscribe before reading the current value so no change is missed
        let conn = self.client.get_async_connection().await?;
        let mut pubsub = conn.into_pubsub();
        pubsub.subscribe(self.keys.channel()).await?;

        let initial = self.current().await?;

        let changes = pubsub
            .into_on_message()
            .map(|msg| -> StoreResult<Option<PlaybackRecord>> {
                let payload = msg.get_payload::<String>()?;
                Ok(serde_json::from_str(&payload)?)
            });

        let catalog = self.catalog.clone();
        let stream = stream::once(future::ready(Ok(initial)))
            .chain(changes)
            .then(move |record| {
                let catalog = catalog.clone();
                async move {
                    match record {
                        Ok(record) => resolve_record(catalog.as_ref(), record).await,
                        Err(e) => Err(e),
                    }
                }
            })
            .boxed();

        tracing::debug!(channel = %self.keys.channel(), "Subscribed to playback record");
        Ok(stream)
    }

    #[tracing::instrument(skip(self))]
    async fn current(&self) -> StoreResult<Option<PlaybackRecord>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(self.keys.record())
            .query_async(&mut conn)
            .await?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    #[tracing::instrument(skip(self, song, playlist), fields(song_id = %song.id, playlist_id = %playlist.id))]
    async fn write(
        &self,
        song: &Song,
        playlist: &Playlist,
        moderator_id: Option<&str>,
    ) -> StoreResult<PlaybackRecord> {
        let record = PlaybackRecord::started(
            song.id.clone(),
            Some(playlist.id.clone()),
            moderator_id.map(str::to_string),
            self.clock.now_millis(),
        );
        self.store_and_publish(Some(&record)).await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self))]
    async fn patch(&self, patch: PlaybackPatch) -> StoreResult<Option<PlaybackRecord>> {
        // TODO: wrap the read-modify-write in WATCH/MULTI so concurrent
        // moderators cannot interleave between GET and SET
        let Some(mut record) = self.current().await? else {
            return Ok(None);
        };

        record.apply(&patch);
        self.store_and_publish(Some(&record)).await?;
        Ok(Some(record))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self) -> StoreResult<()> {
        self.store_and_publish(None).await
    }
}
