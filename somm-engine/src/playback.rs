//! Host-provided playback capability
//!
//! The engine never touches samples. Whatever actually produces sound
//! (a media-player process, an OS audio session, a test stub)
//! implements this trait and is injected at session construction.

use crate::crossfade::TransitionMode;
use somm_model::Track;

/// External playback capability consumed by the engine
pub trait Playback: Send + Sync {
    /// Start (or restart) playback of the given track
    fn play(&self, track: &Track);

    /// Pause whatever is currently playing
    fn pause(&self);

    /// Seek the current track to an absolute position in seconds
    fn seek_to(&self, seconds: f64);

    /// Current progress as `(elapsed, total)` seconds
    fn current_progress(&self) -> (f64, f64);

    /// Signal the style of the upcoming deck swap
    ///
    /// `Smooth` asks the host to ramp volume over its own short
    /// window; the engine only signals *that* a ramp is requested.
    fn crossfade_hint(&self, _mode: TransitionMode) {}
}
