//! External source capabilities and the recs error taxonomy
//!
//! The database, the catalog provider, and the artwork service are
//! collaborators behind trait objects. The assembler only sees these
//! interfaces; hosts inject real or in-memory implementations.

use thiserror::Error;

use somm_model::{ArtworkRef, PlaylistWithTracks, Track};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecsError {
    /// A source failed or is unreachable; the tier is skipped
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The request was superseded while its fetch was in flight
    #[error("request superseded by a newer one")]
    StaleRequest,
}

/// The user's curated personal database
pub trait PersonalDatabase: Send + Sync {
    /// Curated tracks matching the mood or wine driver, up to `limit`
    fn fetch_curated_songs(
        &self,
        mood: Option<&str>,
        wine: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Track>, RecsError>;

    /// The full playlist pool, every playlist with its tracks
    fn fetch_playlist_pool(&self) -> Result<Vec<PlaylistWithTracks>, RecsError>;
}

/// External catalog search provider
pub trait CatalogSearch: Send + Sync {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, RecsError>;
}

/// Artwork lookup, queried off the playback-critical path
pub trait ArtworkSource: Send + Sync {
    fn find_artwork(&self, title: &str, artist: &str) -> Option<ArtworkRef>;
}
