//! somm - dual-deck companion player with mood-aware recommendations
//!
//! Demo host: assembles a recommendation batch for a mood given on the
//! command line, queues it, and lets the auto-mix ticker carry playback
//! across deck swaps with simulated audio.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use somm_engine::{CrossfadeConfig, DeckSide, PlayerSession, SessionEvent, TransitionMode};
use somm_recs::{enrich_artwork, Assembler, RecommendationRequest};

mod config;
mod demo;

use config::Config;
use demo::{DemoArtwork, DemoCatalog, DemoDatabase, SimulatedPlayback};

/// How often the ticker re-evaluates the auto-mix trigger
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Demo track length so a full auto-mix cycle fits in seconds
const DEMO_TRACK_SECONDS: f64 = 12.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load();
    let mood = std::env::args().nth(1).unwrap_or_else(|| "happy".into());
    tracing::info!(%mood, target = config.target_count, "starting session");

    // Assemble recommendations through the background worker so the
    // session never waits on source I/O.
    let assembler = Assembler::new(Arc::new(DemoDatabase), Arc::new(DemoCatalog));
    let (worker, results) = somm_recs::spawn_worker(assembler);
    worker.submit(RecommendationRequest::for_mood(&mood, config.target_count));

    let playback = Arc::new(SimulatedPlayback::new(DEMO_TRACK_SECONDS));
    let (session, events) = PlayerSession::new(
        playback,
        CrossfadeConfig {
            manual_threshold: config.manual_threshold,
            auto_trigger_seconds: config.auto_trigger_seconds,
            ..CrossfadeConfig::default()
        },
    );
    session.crossfader().set_mode(config.mode);

    let output = loop {
        let output = results
            .recv_timeout(Duration::from_secs(10))
            .context("recommendation worker produced no batch")?;
        if worker.ensure_current(output.generation).is_ok() {
            break output;
        }
    };
    let mut tracks = output.result.tracks;
    anyhow::ensure!(!tracks.is_empty(), "no recommendations for mood {mood:?}");
    enrich_artwork(&mut tracks, &DemoArtwork);
    session.notify_recommendation_ready(output.generation, tracks.len());

    session
        .set_queue(tracks, 0, "recommended")
        .context("queueing recommendations")?;

    // Opener on deck A, follower preloaded on deck B.
    let snapshot = session.queue_snapshot();
    session
        .crossfader()
        .load_track(DeckSide::A, snapshot.items[0].clone());
    session.crossfader().play(DeckSide::A);
    if session.advance_queue().is_err() {
        tracing::info!("single-track batch, nothing to preload");
    }

    // Force auto-mix for the demo so the ticker drives the swaps.
    session.crossfader().set_mode(TransitionMode::AutoMix);
    let ticker = somm_engine::spawn_ticker(session.clone(), TICK_INTERVAL);

    // Drain events until the queue runs out.
    let mut done = false;
    while !done {
        match events.recv_timeout(Duration::from_secs(60)) {
            Ok(SessionEvent::DeckSwapCompleted { to }) => {
                tracing::info!(%to, "deck swap completed");
                // Preload the next track onto the now-idle deck.
                if session.advance_queue().is_err() {
                    tracing::info!("end of queue reached, stopping after this track");
                    done = true;
                }
            }
            Ok(SessionEvent::QueueReplaced { len }) => {
                tracing::info!(len, "queue replaced");
            }
            Ok(SessionEvent::RecommendationReady { generation, count }) => {
                tracing::info!(generation, count, "recommendations ready");
            }
            Ok(SessionEvent::Error(message)) => {
                tracing::warn!(%message, "session error");
            }
            Err(_) => {
                tracing::warn!("no session activity, shutting down");
                done = true;
            }
        }
    }

    ticker.stop();
    worker.stop();
    config.save().ok();
    tracing::info!("session finished");
    Ok(())
}
