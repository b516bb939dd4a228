//! Crossfade controller - position tracking and deck-swap decisions
//!
//! Owns both decks and the crossfader position, and guarantees at most
//! one transition in flight. The `transitioning` flag is the single
//! source of truth for that guarantee: it is claimed with an atomic
//! compare-exchange *before* any trigger evaluation proceeds, so a
//! second trigger while a swap resolves is rejected, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::deck::{Deck, DeckSide, DeckSnapshot};
use crate::error::EngineError;
use crate::playback::Playback;
use crate::session::SessionEvent;
use somm_model::Track;

/// Transition style selected by the user
///
/// A flat state machine: freely selectable at any time, and switching
/// never interrupts an in-flight transition - it only affects the
/// next one. Manual threshold triggers fire in every mode; `AutoMix`
/// additionally enables the remaining-time trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionMode {
    /// New deck plays immediately at full volume, old deck stops
    Instant,
    /// Host ramps volume across its own short window
    #[default]
    Smooth,
    /// Smooth, plus automatic trigger near end of track
    AutoMix,
}

/// Tunable crossfade thresholds
///
/// The lower manual threshold is symmetric-by-construction
/// (`1.0 - manual_threshold`) so the pair cannot drift apart.
#[derive(Debug, Clone, Copy)]
pub struct CrossfadeConfig {
    /// Position at or beyond which a drag triggers a swap away from A
    pub manual_threshold: f64,
    /// Remaining seconds at which auto-mix starts the next transition
    pub auto_trigger_seconds: f64,
    /// Rest position after a released drag
    pub center: f64,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            manual_threshold: 0.85,
            auto_trigger_seconds: 10.0,
            center: 0.5,
        }
    }
}

impl CrossfadeConfig {
    /// Mirrored threshold for the B-to-A direction
    pub fn lower_threshold(&self) -> f64 {
        1.0 - self.manual_threshold
    }
}

/// Immutable crossfade view for the host UI
#[derive(Debug, Clone, Copy)]
pub struct CrossfadeSnapshot {
    pub position: f64,
    pub active_deck: DeckSide,
    pub is_transitioning: bool,
    pub mode: TransitionMode,
}

/// State behind the controller's lock
///
/// All trigger evaluation happens under this lock, so position
/// updates are observed in arrival order.
struct FaderState {
    position: f64,
    active: DeckSide,
    mode: TransitionMode,
    deck_a: Deck,
    deck_b: Deck,
    /// Set when any transition fires; consulted by `release_to_center`
    transition_fired: bool,
}

impl FaderState {
    fn deck_mut(&mut self, side: DeckSide) -> &mut Deck {
        match side {
            DeckSide::A => &mut self.deck_a,
            DeckSide::B => &mut self.deck_b,
        }
    }

    fn deck(&self, side: DeckSide) -> &Deck {
        match side {
            DeckSide::A => &self.deck_a,
            DeckSide::B => &self.deck_b,
        }
    }
}

/// Crossfade controller owning the deck pair
pub struct Crossfader {
    state: Mutex<FaderState>,
    /// At-most-one-transition guard; claimed before any swap work
    transitioning: AtomicBool,
    config: CrossfadeConfig,
    playback: Arc<dyn Playback>,
    events: Sender<SessionEvent>,
}

impl Crossfader {
    /// Create a controller with deck A active and the fader centered
    pub fn new(
        config: CrossfadeConfig,
        playback: Arc<dyn Playback>,
        events: Sender<SessionEvent>,
    ) -> Self {
        let mut deck_a = Deck::new(DeckSide::A);
        deck_a.set_active(true);
        Self {
            state: Mutex::new(FaderState {
                position: config.center,
                active: DeckSide::A,
                mode: TransitionMode::default(),
                deck_a,
                deck_b: Deck::new(DeckSide::B),
                transition_fired: false,
            }),
            transitioning: AtomicBool::new(false),
            config,
            playback,
            events,
        }
    }

    /// Store a clamped fader position and evaluate the manual trigger
    ///
    /// Cheap and non-blocking: safe to call once per drag event. A
    /// triggered swap runs after the state lock is released so later
    /// position updates are never delayed by playback calls.
    pub fn set_position(&self, position: f64) {
        let target = {
            let mut state = self.state.lock();
            state.position = position.clamp(0.0, 1.0);
            self.manual_trigger_target(&state, state.position)
        };

        if let Some(side) = target {
            // Expected and frequent under continuous updates; only
            // direct user actions surface this error.
            if let Err(err) = self.start_transition(side) {
                tracing::trace!(%side, %err, "manual trigger rejected");
            }
        }
    }

    /// Threshold check for the manual trigger, mirrored per side
    ///
    /// The guard is consulted first so boundary samples arriving while
    /// a swap resolves can never double-fire.
    fn manual_trigger_target(&self, state: &FaderState, position: f64) -> Option<DeckSide> {
        if self.transitioning.load(Ordering::Acquire) {
            return None;
        }
        match state.active {
            DeckSide::A if position >= self.config.manual_threshold => Some(DeckSide::B),
            DeckSide::B if position <= self.config.lower_threshold() => Some(DeckSide::A),
            _ => None,
        }
    }

    /// Evaluate the manual trigger at a position without storing it
    ///
    /// The stored fader position is left untouched; only `set_position`
    /// commits one.
    pub fn evaluate_manual_trigger(&self, position: f64) {
        let target = {
            let state = self.state.lock();
            self.manual_trigger_target(&state, position.clamp(0.0, 1.0))
        };

        if let Some(side) = target {
            if let Err(err) = self.start_transition(side) {
                tracing::trace!(%side, %err, "manual trigger rejected");
            }
        }
    }

    /// Auto-mix trigger, called once per playback tick
    ///
    /// Pure state checks unless a transition actually fires.
    pub fn evaluate_auto_trigger(&self, remaining_seconds: f64) {
        let target = {
            let state = self.state.lock();
            if state.mode != TransitionMode::AutoMix {
                return;
            }
            if self.transitioning.load(Ordering::Acquire) {
                return;
            }
            if remaining_seconds > self.config.auto_trigger_seconds {
                return;
            }
            state.active.other()
        };

        if let Err(err) = self.start_transition(target) {
            tracing::trace!(%target, %err, "auto trigger rejected");
        }
    }

    /// Swap the audible deck
    ///
    /// Fails with `AlreadyTransitioning` if a swap is in flight; the
    /// competing caller is rejected, not queued. The guard is held for
    /// the full duration of the swap, including the external playback
    /// calls, and reset on completion.
    pub fn start_transition(&self, target: DeckSide) -> Result<(), EngineError> {
        self.transitioning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::AlreadyTransitioning)?;

        let (mode, incoming) = {
            let mut state = self.state.lock();
            state.transition_fired = true;
            (state.mode, state.deck(target).track().cloned())
        };

        tracing::debug!(%target, ?mode, "deck transition started");

        // External calls happen outside the state lock so position
        // updates stay cheap while the swap resolves.
        self.playback.crossfade_hint(mode);
        self.playback.pause();
        if let Some(ref track) = incoming {
            self.playback.play(track);
        }

        {
            let mut state = self.state.lock();
            let outgoing = state.active;
            state.deck_mut(outgoing).pause();
            state.deck_mut(outgoing).set_active(false);
            let deck = state.deck_mut(target);
            deck.set_active(true);
            deck.play();
            state.active = target;
        }

        let _ = self
            .events
            .try_send(SessionEvent::DeckSwapCompleted { to: target });
        self.transitioning.store(false, Ordering::Release);
        Ok(())
    }

    /// End of a manual drag: recenter only if nothing fired
    pub fn release_to_center(&self) {
        let mut state = self.state.lock();
        if !state.transition_fired {
            state.position = self.config.center;
        }
        state.transition_fired = false;
    }

    /// Select the style of the next transition
    ///
    /// Never touches an in-flight transition.
    pub fn set_mode(&self, mode: TransitionMode) {
        self.state.lock().mode = mode;
    }

    pub fn mode(&self) -> TransitionMode {
        self.state.lock().mode
    }

    /// Load a track into one side without disturbing the other
    pub fn load_track(&self, side: DeckSide, track: Track) {
        self.state.lock().deck_mut(side).load(track);
    }

    /// Start the given deck playing; forwards to the playback
    /// capability only when that deck is the audible one
    pub fn play(&self, side: DeckSide) {
        let track = {
            let mut state = self.state.lock();
            state.deck_mut(side).play();
            if state.active == side {
                state.deck(side).track().cloned()
            } else {
                None
            }
        };
        if let Some(ref track) = track {
            self.playback.play(track);
        }
    }

    /// Pause the given deck
    pub fn pause(&self, side: DeckSide) {
        let was_active = {
            let mut state = self.state.lock();
            state.deck_mut(side).pause();
            state.active == side
        };
        if was_active {
            self.playback.pause();
        }
    }

    pub fn active_deck(&self) -> DeckSide {
        self.state.lock().active
    }

    pub fn position(&self) -> f64 {
        self.state.lock().position
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning.load(Ordering::Acquire)
    }

    /// Immutable controller view for the host
    pub fn snapshot(&self) -> CrossfadeSnapshot {
        let state = self.state.lock();
        CrossfadeSnapshot {
            position: state.position,
            active_deck: state.active,
            is_transitioning: self.transitioning.load(Ordering::Acquire),
            mode: state.mode,
        }
    }

    /// Read-only views of both decks
    pub fn deck_snapshots(&self) -> (DeckSnapshot, DeckSnapshot) {
        let state = self.state.lock();
        (state.deck_a.snapshot(), state.deck_b.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::PlayState;
    use crossbeam_channel::{bounded, unbounded, Receiver};
    use std::thread;

    /// Playback stub that records calls
    #[derive(Default)]
    struct StubPlayback {
        calls: Mutex<Vec<String>>,
    }

    impl Playback for StubPlayback {
        fn play(&self, track: &Track) {
            self.calls.lock().push(format!("play:{}", track.id));
        }
        fn pause(&self) {
            self.calls.lock().push("pause".into());
        }
        fn seek_to(&self, _seconds: f64) {}
        fn current_progress(&self) -> (f64, f64) {
            (0.0, 0.0)
        }
        fn crossfade_hint(&self, mode: TransitionMode) {
            self.calls.lock().push(format!("hint:{:?}", mode));
        }
    }

    fn make_crossfader() -> (Crossfader, Receiver<SessionEvent>) {
        let (tx, rx) = bounded(64);
        let fader = Crossfader::new(CrossfadeConfig::default(), Arc::new(StubPlayback::default()), tx);
        fader.load_track(DeckSide::A, Track::new("a1", "Opener", "Artist"));
        fader.load_track(DeckSide::B, Track::new("b1", "Follower", "Artist"));
        (fader, rx)
    }

    fn swap_count(rx: &Receiver<SessionEvent>) -> usize {
        rx.try_iter()
            .filter(|e| matches!(e, SessionEvent::DeckSwapCompleted { .. }))
            .count()
    }

    #[test]
    fn test_drag_sequence_fires_exactly_once() {
        let (fader, rx) = make_crossfader();
        for p in [0.5, 0.6, 0.86, 0.90] {
            fader.set_position(p);
        }
        assert_eq!(swap_count(&rx), 1);
        assert_eq!(fader.active_deck(), DeckSide::B);
    }

    #[test]
    fn test_threshold_is_mirrored_for_deck_b() {
        let (fader, rx) = make_crossfader();
        fader.start_transition(DeckSide::B).unwrap();
        assert_eq!(swap_count(&rx), 1);

        // Above the lower threshold: no trigger for B
        fader.set_position(0.2);
        assert_eq!(swap_count(&rx), 0);

        fader.set_position(0.15);
        assert_eq!(swap_count(&rx), 1);
        assert_eq!(fader.active_deck(), DeckSide::A);
    }

    #[test]
    fn test_position_is_clamped() {
        let (fader, _rx) = make_crossfader();
        fader.set_position(1.7);
        // Clamps to 1.0, which also crosses the threshold
        assert_eq!(fader.position(), 1.0);
        fader.set_position(-0.3);
        assert_eq!(fader.position(), 0.0);
    }

    #[test]
    fn test_release_to_center_only_without_transition() {
        let (fader, _rx) = make_crossfader();
        fader.set_position(0.7);
        fader.release_to_center();
        assert_eq!(fader.position(), 0.5);

        fader.set_position(0.9); // fires
        fader.release_to_center();
        assert_eq!(fader.position(), 0.9);

        // The fired flag is consumed by the release
        fader.set_position(0.6);
        fader.release_to_center();
        assert_eq!(fader.position(), 0.5);
    }

    #[test]
    fn test_swap_updates_deck_states() {
        let (fader, _rx) = make_crossfader();
        fader.play(DeckSide::A);
        fader.start_transition(DeckSide::B).unwrap();

        let (a, b) = fader.deck_snapshots();
        assert!(!a.is_active);
        assert_eq!(a.play_state, PlayState::Paused);
        assert!(b.is_active);
        assert_eq!(b.play_state, PlayState::Playing);
        assert!(!fader.is_transitioning());
    }

    #[test]
    fn test_auto_trigger_requires_auto_mix_mode() {
        let (fader, rx) = make_crossfader();
        fader.evaluate_auto_trigger(5.0);
        assert_eq!(swap_count(&rx), 0);

        fader.set_mode(TransitionMode::AutoMix);
        fader.evaluate_auto_trigger(11.0);
        assert_eq!(swap_count(&rx), 0);

        fader.evaluate_auto_trigger(9.5);
        assert_eq!(swap_count(&rx), 1);
        assert_eq!(fader.active_deck(), DeckSide::B);
    }

    #[test]
    fn test_evaluate_manual_trigger_leaves_position_untouched() {
        let (fader, rx) = make_crossfader();
        fader.set_position(0.6);

        fader.evaluate_manual_trigger(0.9);
        assert_eq!(swap_count(&rx), 1);
        assert_eq!(fader.active_deck(), DeckSide::B);
        assert_eq!(fader.position(), 0.6);

        // Between the thresholds nothing fires
        fader.evaluate_manual_trigger(0.4);
        assert_eq!(swap_count(&rx), 0);
        assert_eq!(fader.position(), 0.6);
    }

    #[test]
    fn test_manual_trigger_fires_in_every_mode() {
        for mode in [
            TransitionMode::Instant,
            TransitionMode::Smooth,
            TransitionMode::AutoMix,
        ] {
            let (fader, rx) = make_crossfader();
            fader.set_mode(mode);
            fader.set_position(0.9);
            assert_eq!(swap_count(&rx), 1, "mode {:?} must honor the drag", mode);
        }
    }

    #[test]
    fn test_mode_change_affects_next_transition_only() {
        let (fader, _rx) = make_crossfader();
        fader.set_mode(TransitionMode::Instant);
        fader.start_transition(DeckSide::B).unwrap();
        fader.set_mode(TransitionMode::AutoMix);
        // Nothing transitioned as a side effect of the mode change
        assert_eq!(fader.active_deck(), DeckSide::B);
        assert!(!fader.is_transitioning());
    }

    /// Playback stub that parks inside `play` until released, keeping
    /// the transition in flight long enough to race against
    struct BlockingPlayback {
        entered_tx: crossbeam_channel::Sender<()>,
        release_rx: Receiver<()>,
    }

    impl Playback for BlockingPlayback {
        fn play(&self, _track: &Track) {
            let _ = self.entered_tx.send(());
            let _ = self.release_rx.recv();
        }
        fn pause(&self) {}
        fn seek_to(&self, _seconds: f64) {}
        fn current_progress(&self) -> (f64, f64) {
            (0.0, 0.0)
        }
    }

    #[test]
    fn test_concurrent_transitions_one_wins() {
        let (entered_tx, entered_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        let (event_tx, event_rx) = bounded(64);
        let fader = Arc::new(Crossfader::new(
            CrossfadeConfig::default(),
            Arc::new(BlockingPlayback {
                entered_tx,
                release_rx,
            }),
            event_tx,
        ));
        fader.load_track(DeckSide::A, Track::new("a1", "Opener", "Artist"));
        fader.load_track(DeckSide::B, Track::new("b1", "Follower", "Artist"));

        let first = {
            let fader = fader.clone();
            thread::spawn(move || fader.start_transition(DeckSide::B))
        };

        // Wait until the first swap is parked inside the playback call
        entered_rx.recv().unwrap();
        assert_eq!(
            fader.start_transition(DeckSide::A),
            Err(EngineError::AlreadyTransitioning)
        );

        release_tx.send(()).unwrap();
        assert_eq!(first.join().unwrap(), Ok(()));
        assert_eq!(swap_count(&event_rx), 1);
        assert_eq!(fader.active_deck(), DeckSide::B);
        assert!(!fader.is_transitioning());
    }

    #[test]
    fn test_transition_to_empty_deck_still_swaps() {
        let (tx, rx) = bounded(64);
        let fader = Crossfader::new(CrossfadeConfig::default(), Arc::new(StubPlayback::default()), tx);
        fader.load_track(DeckSide::A, Track::new("a1", "Opener", "Artist"));

        fader.start_transition(DeckSide::B).unwrap();
        assert_eq!(fader.active_deck(), DeckSide::B);
        let (_, b) = fader.deck_snapshots();
        assert_eq!(b.play_state, PlayState::Empty);
        assert_eq!(swap_count(&rx), 1);
    }
}
