//! Recommendation assembly for somm
//!
//! Builds target-sized track lists by merging three sources in order
//! (personal database, playlist pool, catalog search) with duplicate
//! suppression, plus a background worker that drops stale requests
//! and an artwork enrichment pass.

pub mod assembler;
pub mod enrich;
pub mod sources;
pub mod worker;

pub use assembler::{
    default_matcher, Assembler, PlaylistMatcher, RecommendationRequest, RecommendationResult,
    DB_LIMIT_BEDTIME, DB_LIMIT_MOOD, DB_LIMIT_WINE,
};
pub use enrich::{attach_artwork, enrich_artwork};
pub use sources::{ArtworkSource, CatalogSearch, PersonalDatabase, RecsError};
pub use worker::{spawn_worker, RecsWorker, WorkerOutput};
