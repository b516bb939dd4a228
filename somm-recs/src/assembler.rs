//! Tiered recommendation assembly
//!
//! Three sources are consumed in a fixed order (personal database,
//! playlist pool, catalog search) into one target-sized list. Every
//! accepted track registers its dedup key in a seen-set so later
//! tiers never re-add a song the user already got.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::sources::{CatalogSearch, PersonalDatabase};
use somm_model::Track;

/// Curated-DB cap for a plain mood request
pub const DB_LIMIT_MOOD: usize = 2;
/// Curated-DB cap for a wine-pairing request
pub const DB_LIMIT_WINE: usize = 5;
/// Curated-DB cap for the bedtime mood, which leans on the DB heavily
pub const DB_LIMIT_BEDTIME: usize = 30;

/// Mood to catalog search query; moods not listed fall back to
/// `fallback_query`
const MOOD_QUERIES: &[(&str, &str)] = &[
    ("happy", "feel good upbeat hits"),
    ("romantic", "romantic love songs"),
    ("chill", "chill lounge downtempo"),
    ("party", "dance party anthems"),
    ("bedtime", "calm sleep ambient"),
    ("melancholy", "sad slow ballads"),
];

fn fallback_query(driver: &str) -> String {
    format!("{driver} music playlist")
}

/// Predicate deciding whether a playlist belongs to the matched
/// partition for a request driver; arguments are (playlist_name,
/// driver)
pub type PlaylistMatcher = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Default heuristic: case-insensitive name containment
pub fn default_matcher() -> PlaylistMatcher {
    Arc::new(|name: &str, driver: &str| name.to_lowercase().contains(&driver.to_lowercase()))
}

/// What to assemble: driven by a mood or a wine type, never both
#[derive(Debug, Clone, Default)]
pub struct RecommendationRequest {
    mood: Option<String>,
    wine_type: Option<String>,
    pub target_count: usize,
}

impl RecommendationRequest {
    pub fn for_mood(mood: impl Into<String>, target_count: usize) -> Self {
        Self {
            mood: Some(mood.into()),
            wine_type: None,
            target_count,
        }
    }

    pub fn for_wine(wine_type: impl Into<String>, target_count: usize) -> Self {
        Self {
            mood: None,
            wine_type: Some(wine_type.into()),
            target_count,
        }
    }

    /// Switch the driver to a mood, clearing any wine selection
    pub fn set_mood(&mut self, mood: impl Into<String>) {
        self.mood = Some(mood.into());
        self.wine_type = None;
    }

    /// Switch the driver to a wine type, clearing any mood selection
    pub fn set_wine_type(&mut self, wine_type: impl Into<String>) {
        self.wine_type = Some(wine_type.into());
        self.mood = None;
    }

    pub fn mood(&self) -> Option<&str> {
        self.mood.as_deref()
    }

    pub fn wine_type(&self) -> Option<&str> {
        self.wine_type.as_deref()
    }

    /// The active selector string, whichever side holds it
    pub fn driver(&self) -> &str {
        self.mood
            .as_deref()
            .or(self.wine_type.as_deref())
            .unwrap_or("")
    }

    /// Curated-DB cap for this request
    pub fn db_limit(&self) -> usize {
        match (&self.mood, &self.wine_type) {
            (Some(mood), _) if mood.eq_ignore_ascii_case("bedtime") => DB_LIMIT_BEDTIME,
            (Some(_), _) => DB_LIMIT_MOOD,
            (None, Some(_)) => DB_LIMIT_WINE,
            (None, None) => DB_LIMIT_MOOD,
        }
    }
}

/// An assembled batch
#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub tracks: Vec<Track>,
}

/// The tiered merge over injected sources
pub struct Assembler {
    db: Arc<dyn PersonalDatabase>,
    catalog: Arc<dyn CatalogSearch>,
    matcher: PlaylistMatcher,
}

impl Assembler {
    pub fn new(db: Arc<dyn PersonalDatabase>, catalog: Arc<dyn CatalogSearch>) -> Self {
        Self {
            db,
            catalog,
            matcher: default_matcher(),
        }
    }

    /// Replace the playlist-match heuristic
    pub fn with_matcher(mut self, matcher: PlaylistMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Build a batch eagerly, tier by tier
    ///
    /// A failing source skips its tier; the result length is always
    /// `min(target_count, total unique tracks available)`.
    pub fn assemble(&self, request: &RecommendationRequest) -> RecommendationResult {
        let target = request.target_count;
        let mut seen: HashSet<String> = HashSet::new();
        let mut out: Vec<Track> = Vec::with_capacity(target);

        self.db_tier(request, target, &mut seen, &mut out);
        if out.len() < target {
            self.playlist_tier(request, target, &mut seen, &mut out);
        }
        if out.len() < target {
            self.catalog_tier(request, target, &mut seen, &mut out);
        }

        tracing::debug!(
            driver = request.driver(),
            target,
            assembled = out.len(),
            "recommendation batch assembled"
        );
        RecommendationResult { tracks: out }
    }

    fn db_tier(
        &self,
        request: &RecommendationRequest,
        target: usize,
        seen: &mut HashSet<String>,
        out: &mut Vec<Track>,
    ) {
        let limit = request.db_limit().min(target);
        if limit == 0 {
            return;
        }
        match self
            .db
            .fetch_curated_songs(request.mood(), request.wine_type(), limit)
        {
            Ok(tracks) => take_unique(tracks, limit.min(target - out.len()), seen, out),
            Err(e) => tracing::warn!(error = %e, "curated DB tier skipped"),
        }
    }

    fn playlist_tier(
        &self,
        request: &RecommendationRequest,
        target: usize,
        seen: &mut HashSet<String>,
        out: &mut Vec<Track>,
    ) {
        let pool = match self.db.fetch_playlist_pool() {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "playlist tier skipped");
                return;
            }
        };

        let driver = request.driver();
        let mut matched: Vec<Track> = Vec::new();
        let mut unmatched: Vec<Track> = Vec::new();
        for playlist in pool {
            let bucket = if (self.matcher)(&playlist.name, driver) {
                &mut matched
            } else {
                &mut unmatched
            };
            bucket.extend(playlist.tracks);
        }

        let mut rng = rand::thread_rng();
        matched.shuffle(&mut rng);
        unmatched.shuffle(&mut rng);

        take_unique(matched, target - out.len(), seen, out);
        if out.len() < target {
            take_unique(unmatched, target - out.len(), seen, out);
        }
    }

    fn catalog_tier(
        &self,
        request: &RecommendationRequest,
        target: usize,
        seen: &mut HashSet<String>,
        out: &mut Vec<Track>,
    ) {
        for query in catalog_queries(request.driver()) {
            if out.len() >= target {
                break;
            }
            // Ask for the full target: results already seen in earlier
            // tiers are skipped, so the remaining count alone may not
            // surface enough unique tracks.
            match self.catalog.search(&query, target) {
                Ok(tracks) => take_unique(tracks, target - out.len(), seen, out),
                Err(e) => tracing::warn!(error = %e, query, "catalog query skipped"),
            }
        }
    }
}

/// Append tracks whose dedup key is unseen, up to `room`
fn take_unique(tracks: Vec<Track>, room: usize, seen: &mut HashSet<String>, out: &mut Vec<Track>) {
    let mut taken = 0;
    for track in tracks {
        if taken >= room {
            break;
        }
        if seen.insert(track.dedup_key()) {
            out.push(track);
            taken += 1;
        }
    }
}

/// Search queries for a driver: the table entry when present, then
/// the generic fallback
fn catalog_queries(driver: &str) -> Vec<String> {
    let lowered = driver.to_lowercase();
    let mut queries = Vec::new();
    if let Some((_, query)) = MOOD_QUERIES.iter().find(|(mood, _)| *mood == lowered) {
        queries.push((*query).to_string());
    }
    queries.push(fallback_query(driver));
    queries
}
