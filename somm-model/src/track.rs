//! Playable track model and related value types

/// Where a track was sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Curated personal song database
    #[default]
    Db,
    /// User playlist pool
    Playlist,
    /// Catalog search service
    Catalog,
}

/// Coarse energy tag used to group queue segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyPhase {
    Warmup,
    Peak,
    Cooldown,
}

/// Opaque reference to artwork resolved by the enrichment capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkRef {
    pub url: String,
}

/// An immutable playable item
///
/// Identity for dedup purposes is the normalized `title|artist` pair,
/// not `id`: the same song reached through two sources must collapse
/// to one queue entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_seconds: f64,
    pub source: SourceKind,
    pub mood_tags: Vec<String>,
    pub is_our_song: bool,
    pub energy_phase: Option<EnergyPhase>,
    pub artwork: Option<ArtworkRef>,
}

impl Track {
    /// Create a track with the required fields; the rest default
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            duration_seconds: 0.0,
            source: SourceKind::default(),
            mood_tags: Vec::new(),
            is_our_song: false,
            energy_phase: None,
            artwork: None,
        }
    }

    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_energy_phase(mut self, phase: EnergyPhase) -> Self {
        self.energy_phase = Some(phase);
        self
    }

    pub fn with_mood_tags(mut self, tags: &[&str]) -> Self {
        self.mood_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Normalized dedup key: `lowercase(title)|lowercase(artist)`
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}",
            self.title.trim().to_lowercase(),
            self.artist.trim().to_lowercase()
        )
    }
}

/// A user playlist together with its resolved tracks
#[derive(Debug, Clone)]
pub struct PlaylistWithTracks {
    pub name: String,
    pub tracks: Vec<Track>,
}

impl PlaylistWithTracks {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_is_case_insensitive() {
        let a = Track::new("1", "Harvest Moon", "Neil Young");
        let b = Track::new("2", "harvest moon", "NEIL YOUNG");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_trims_whitespace() {
        let a = Track::new("1", " Vienna ", "Billy Joel");
        let b = Track::new("2", "Vienna", "Billy Joel ");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_separates_title_and_artist() {
        let a = Track::new("1", "ab", "c");
        let b = Track::new("2", "a", "bc");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_builder_defaults() {
        let t = Track::new("1", "Song", "Artist");
        assert_eq!(t.source, SourceKind::Db);
        assert!(t.energy_phase.is_none());
        assert!(!t.is_our_song);
        assert!(t.artwork.is_none());
    }
}
