//! Deck implementation - one of two playback slots

use somm_model::Track;

/// Which side of the crossfader a deck sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckSide {
    A,
    B,
}

impl DeckSide {
    /// The opposite side
    pub fn other(self) -> Self {
        match self {
            DeckSide::A => DeckSide::B,
            DeckSide::B => DeckSide::A,
        }
    }
}

impl std::fmt::Display for DeckSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckSide::A => write!(f, "A"),
            DeckSide::B => write!(f, "B"),
        }
    }
}

/// Playback state for a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Empty,
    Loaded,
    Playing,
    Paused,
}

/// A single playback slot
///
/// Exactly two instances exist per session, owned by the crossfade
/// controller. Nothing else holds a mutable reference to a deck.
#[derive(Debug)]
pub struct Deck {
    side: DeckSide,
    track: Option<Track>,
    play_state: PlayState,
    is_active: bool,
}

/// Immutable deck view for the host UI
#[derive(Debug, Clone)]
pub struct DeckSnapshot {
    pub side: DeckSide,
    pub track: Option<Track>,
    pub play_state: PlayState,
    pub is_active: bool,
}

impl Deck {
    /// Create a new empty deck
    pub fn new(side: DeckSide) -> Self {
        Self {
            side,
            track: None,
            play_state: PlayState::Empty,
            is_active: false,
        }
    }

    /// Load a track into the deck, replacing whatever was there
    pub fn load(&mut self, track: Track) {
        self.track = Some(track);
        self.play_state = PlayState::Loaded;
    }

    /// Check if the deck has a track loaded
    pub fn is_loaded(&self) -> bool {
        self.track.is_some()
    }

    /// Start playback
    pub fn play(&mut self) {
        if self.is_loaded() {
            self.play_state = PlayState::Playing;
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.play_state == PlayState::Playing {
            self.play_state = PlayState::Paused;
        }
    }

    /// Unload the track and reset state
    pub fn clear(&mut self) {
        self.track = None;
        self.play_state = PlayState::Empty;
    }

    pub fn side(&self) -> DeckSide {
        self.side
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    /// Get deck state for the host
    pub fn snapshot(&self) -> DeckSnapshot {
        DeckSnapshot {
            side: self.side,
            track: self.track.clone(),
            play_state: self.play_state,
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_requires_loaded_track() {
        let mut deck = Deck::new(DeckSide::A);
        deck.play();
        assert_eq!(deck.play_state(), PlayState::Empty);

        deck.load(Track::new("1", "Song", "Artist"));
        assert_eq!(deck.play_state(), PlayState::Loaded);
        deck.play();
        assert_eq!(deck.play_state(), PlayState::Playing);
    }

    #[test]
    fn test_pause_only_affects_playing_deck() {
        let mut deck = Deck::new(DeckSide::B);
        deck.load(Track::new("1", "Song", "Artist"));
        deck.pause();
        assert_eq!(deck.play_state(), PlayState::Loaded);

        deck.play();
        deck.pause();
        assert_eq!(deck.play_state(), PlayState::Paused);
    }

    #[test]
    fn test_load_replaces_track() {
        let mut deck = Deck::new(DeckSide::A);
        deck.load(Track::new("1", "First", "Artist"));
        deck.play();
        deck.load(Track::new("2", "Second", "Artist"));
        assert_eq!(deck.play_state(), PlayState::Loaded);
        assert_eq!(deck.track().unwrap().title, "Second");
    }

    #[test]
    fn test_other_side() {
        assert_eq!(DeckSide::A.other(), DeckSide::B);
        assert_eq!(DeckSide::B.other(), DeckSide::A);
    }
}
