//! Player session - dependency-injected wiring and the ticker thread
//!
//! A session is constructed explicitly by the host and passed around;
//! there is no ambient global player. State leaves the session only
//! as immutable snapshots, and changes are announced on a bounded
//! event channel the host can drain at its own pace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::crossfade::{CrossfadeConfig, CrossfadeSnapshot, Crossfader};
use crate::deck::{DeckSide, DeckSnapshot};
use crate::error::EngineError;
use crate::playback::Playback;
use crate::queue::{PhaseGroup, Queue, QueueSnapshot};
use somm_model::Track;

/// Capacity headroom for event bursts without saturation
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Events announced to the host
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A deck swap resolved; `to` is now the audible deck
    DeckSwapCompleted { to: DeckSide },
    /// The queue was replaced wholesale
    QueueReplaced { len: usize },
    /// A recommendation batch finished assembling
    RecommendationReady { generation: u64, count: usize },
    /// A recoverable error worth surfacing to the user
    Error(String),
}

/// One playback session: deck pair, crossfader, and queue
pub struct PlayerSession {
    crossfader: Crossfader,
    queue: Mutex<Queue>,
    playback: Arc<dyn Playback>,
    event_tx: Sender<SessionEvent>,
}

impl PlayerSession {
    /// Build a session around a host-provided playback capability
    pub fn new(
        playback: Arc<dyn Playback>,
        config: CrossfadeConfig,
    ) -> (Arc<Self>, Receiver<SessionEvent>) {
        let (event_tx, event_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        let session = Arc::new(Self {
            crossfader: Crossfader::new(config, playback.clone(), event_tx.clone()),
            queue: Mutex::new(Queue::new()),
            playback,
            event_tx,
        });
        (session, event_rx)
    }

    /// The crossfade controller (owns both decks)
    pub fn crossfader(&self) -> &Crossfader {
        &self.crossfader
    }

    /// Replace the queue wholesale, announcing the change
    pub fn set_queue(
        &self,
        tracks: Vec<Track>,
        start_at: usize,
        source_tab: &str,
    ) -> Result<(), EngineError> {
        let len = {
            let mut queue = self.queue.lock();
            queue.set_queue(tracks, start_at)?;
            queue.set_source_tab(source_tab);
            queue.len()
        };
        let _ = self.event_tx.try_send(SessionEvent::QueueReplaced { len });
        Ok(())
    }

    /// Advance the queue and load the new current track into the
    /// inactive deck, ready for the next transition
    pub fn advance_queue(&self) -> Result<Track, EngineError> {
        let track = self.queue.lock().next()?;
        let standby = self.crossfader.active_deck().other();
        self.crossfader.load_track(standby, track.clone());
        Ok(track)
    }

    /// Step the queue back
    pub fn previous_track(&self) -> Result<Track, EngineError> {
        self.queue.lock().previous()
    }

    /// Shuffle the queue in place, current track pinned first
    pub fn shuffle_queue(&self) {
        self.queue.lock().shuffle();
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        self.queue.lock().snapshot()
    }

    pub fn queue_phase_groups(&self) -> Vec<PhaseGroup> {
        self.queue.lock().group_by_energy_phase()
    }

    pub fn crossfade_snapshot(&self) -> CrossfadeSnapshot {
        self.crossfader.snapshot()
    }

    pub fn deck_snapshots(&self) -> (DeckSnapshot, DeckSnapshot) {
        self.crossfader.deck_snapshots()
    }

    /// Surface a recoverable host-side failure on the event stream
    pub fn report_error(&self, message: impl Into<String>) {
        let _ = self.event_tx.try_send(SessionEvent::Error(message.into()));
    }

    /// Forward an assembled recommendation batch into the event stream
    pub fn notify_recommendation_ready(&self, generation: u64, count: usize) {
        let _ = self
            .event_tx
            .try_send(SessionEvent::RecommendationReady { generation, count });
    }

    /// One scheduler tick: read progress, evaluate the auto trigger
    ///
    /// Cheap unless a transition actually fires; safe to call at any
    /// frequency.
    pub fn tick(&self) {
        let (elapsed, total) = self.playback.current_progress();
        if total > 0.0 {
            self.crossfader.evaluate_auto_trigger(total - elapsed);
        }
    }
}

/// Handle to a running ticker thread
pub struct TickerHandle {
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl TickerHandle {
    /// Signal shutdown and wait for the thread to exit
    pub fn stop(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
    }
}

/// Spawn the engine-owned periodic scheduler
///
/// Auto-mix evaluation is driven by this thread, decoupled from any
/// rendering frame rate the host might have.
pub fn spawn_ticker(session: Arc<PlayerSession>, interval: Duration) -> TickerHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let handle = thread::spawn(move || {
        while !flag.load(Ordering::Relaxed) {
            session.tick();
            thread::sleep(interval);
        }
    });
    TickerHandle { shutdown, handle }
}
