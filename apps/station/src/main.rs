use std::sync::Arc;

use radiyo_station::config::Config;
use radiyo_station::{StationBackend, StationSession, SystemClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radiyo_station=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.common.environment,
        prefix = %config.key_prefix,
        "Starting Radiyo station"
    );

    let clock = Arc::new(SystemClock);
    let backend = StationBackend::try_with_redis(&config, clock.clone()).await;
    if config.common.environment.is_production() && !backend.is_redis_backed() {
        tracing::warn!("Production station running without Redis, state is not shared");
    }
    let session = StationSession::start(backend, clock, config.reset_on_start).await;

    let mut now_playing = session.coordinator().subscribe();
    let mut errors = session.coordinator().errors();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for shutdown signal");
                }
                break;
            }
            changed = now_playing.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = now_playing.borrow_and_update().clone();
                match &state.song {
                    Some(song) => tracing::info!(
                        song_id = %song.id,
                        title = %song.title,
                        artist = %song.artist,
                        phase = ?state.phase(),
                        origin = ?state.origin,
                        "Now playing changed"
                    ),
                    None => tracing::info!(origin = ?state.origin, "Station idle"),
                }
            }
            changed = errors.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(notice) = errors.borrow_and_update().clone() {
                    tracing::warn!(
                        operation = notice.operation,
                        message = %notice.message,
                        "Station command failed"
                    );
                }
            }
        }
    }

    tracing::info!("Shutting down Radiyo station");
    session.shutdown().await;

    Ok(())
}
