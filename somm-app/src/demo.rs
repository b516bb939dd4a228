//! Demo collaborators: a clock-driven playback stub and in-memory
//! recommendation sources
//!
//! These stand in for the real media player, database, and catalog so
//! the binary can run a full session end to end on any machine.

use std::time::Instant;

use parking_lot::Mutex;

use somm_engine::{Playback, TransitionMode};
use somm_model::{ArtworkRef, EnergyPhase, PlaylistWithTracks, SourceKind, Track};
use somm_recs::{ArtworkSource, CatalogSearch, PersonalDatabase, RecsError};

struct PlayingState {
    total: f64,
    started: Instant,
    paused_at: Option<f64>,
}

/// Playback that advances a wall clock instead of producing sound
pub struct SimulatedPlayback {
    state: Mutex<Option<PlayingState>>,
    /// Fake track length in seconds; short so demos finish quickly
    pub simulated_duration: f64,
}

impl SimulatedPlayback {
    pub fn new(simulated_duration: f64) -> Self {
        Self {
            state: Mutex::new(None),
            simulated_duration,
        }
    }
}

impl Playback for SimulatedPlayback {
    fn play(&self, track: &Track) {
        let total = if track.duration_seconds > 0.0 {
            track.duration_seconds
        } else {
            self.simulated_duration
        };
        tracing::info!(title = %track.title, artist = %track.artist, "playing");
        *self.state.lock() = Some(PlayingState {
            total,
            started: Instant::now(),
            paused_at: None,
        });
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        if let Some(ref mut playing) = *state {
            if playing.paused_at.is_none() {
                playing.paused_at = Some(playing.started.elapsed().as_secs_f64());
            }
        }
    }

    fn seek_to(&self, seconds: f64) {
        let mut state = self.state.lock();
        if let Some(ref mut playing) = *state {
            playing.started = Instant::now() - std::time::Duration::from_secs_f64(seconds);
            playing.paused_at = None;
        }
    }

    fn current_progress(&self) -> (f64, f64) {
        let state = self.state.lock();
        match *state {
            Some(ref playing) => {
                let elapsed = playing
                    .paused_at
                    .unwrap_or_else(|| playing.started.elapsed().as_secs_f64());
                (elapsed.min(playing.total), playing.total)
            }
            None => (0.0, 0.0),
        }
    }

    fn crossfade_hint(&self, mode: TransitionMode) {
        tracing::info!(?mode, "crossfade hint");
    }
}

fn db_track(id: &str, title: &str, artist: &str, moods: &[&str]) -> Track {
    Track::new(id, title, artist)
        .with_source(SourceKind::Db)
        .with_duration(30.0)
        .with_mood_tags(moods)
}

fn pl_track(id: &str, title: &str, artist: &str, phase: EnergyPhase) -> Track {
    Track::new(id, title, artist)
        .with_source(SourceKind::Playlist)
        .with_duration(30.0)
        .with_energy_phase(phase)
}

/// In-memory curated database with a couple of moods covered
pub struct DemoDatabase;

impl PersonalDatabase for DemoDatabase {
    fn fetch_curated_songs(
        &self,
        mood: Option<&str>,
        wine: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Track>, RecsError> {
        let driver = mood.or(wine).unwrap_or("").to_lowercase();
        let curated = vec![
            db_track("db-1", "Golden Hour", "Vera Lane", &["happy", "chill"]),
            db_track("db-2", "Corkscrew", "The Cellars", &["happy", "party"]),
            db_track("db-3", "Velvet Red", "Noir Quartet", &["romantic", "merlot"]),
            db_track("db-4", "Slow Decant", "Mira", &["chill", "bedtime"]),
        ];
        Ok(curated
            .into_iter()
            .filter(|t| t.mood_tags.iter().any(|m| m.to_lowercase() == driver))
            .take(limit)
            .collect())
    }

    fn fetch_playlist_pool(&self) -> Result<Vec<PlaylistWithTracks>, RecsError> {
        Ok(vec![
            PlaylistWithTracks::new(
                "Happy Hour",
                vec![
                    pl_track("pl-1", "Sunset Pour", "Vera Lane", EnergyPhase::Warmup),
                    pl_track("pl-2", "Clink", "Glass Act", EnergyPhase::Peak),
                    pl_track("pl-3", "Last Call", "Glass Act", EnergyPhase::Cooldown),
                ],
            ),
            PlaylistWithTracks::new(
                "Dinner Party",
                vec![
                    pl_track("pl-4", "Table Setting", "Noir Quartet", EnergyPhase::Warmup),
                    pl_track("pl-5", "Second Course", "Mira", EnergyPhase::Peak),
                ],
            ),
        ])
    }
}

/// In-memory catalog; every query returns the same small shelf
pub struct DemoCatalog;

impl CatalogSearch for DemoCatalog {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, RecsError> {
        tracing::debug!(query, limit, "catalog search");
        let shelf = vec![
            Track::new("cat-1", "House Pour", "DJ Decant")
                .with_source(SourceKind::Catalog)
                .with_duration(30.0),
            Track::new("cat-2", "Tannin", "Barrel Aged")
                .with_source(SourceKind::Catalog)
                .with_duration(30.0),
            Track::new("cat-3", "Aftertaste", "Barrel Aged")
                .with_source(SourceKind::Catalog)
                .with_duration(30.0),
        ];
        Ok(shelf.into_iter().take(limit).collect())
    }
}

/// Deterministic artwork lookup keyed on title and artist
pub struct DemoArtwork;

impl ArtworkSource for DemoArtwork {
    fn find_artwork(&self, title: &str, artist: &str) -> Option<ArtworkRef> {
        let slug: String = format!("{title}-{artist}")
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        Some(ArtworkRef {
            url: format!("https://art.somm.example/{slug}.jpg"),
        })
    }
}
