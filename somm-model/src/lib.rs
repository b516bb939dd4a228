//! Value types shared across the SOMM engine crates.
//!
//! Everything in this crate is an immutable value: a `Track` never
//! changes after construction, so containers can hand out clones and
//! snapshots without coordination.

mod track;

pub use track::{ArtworkRef, EnergyPhase, PlaylistWithTracks, SourceKind, Track};
