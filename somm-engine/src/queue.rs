//! Play queue - ordered sequence, navigation, energy-phase grouping

use rand::seq::SliceRandom;

use crate::error::EngineError;
use somm_model::{EnergyPhase, Track};

/// A contiguous run of same-phase tracks in queue order
#[derive(Debug, Clone)]
pub struct PhaseGroup {
    pub phase: Option<EnergyPhase>,
    pub tracks: Vec<Track>,
}

/// Immutable queue view for the host UI
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub items: Vec<Track>,
    pub current_index: usize,
    pub source_tab: String,
}

/// The ordered play sequence
///
/// Invariant: `current_index` is in bounds whenever `items` is
/// non-empty; it is meaningless for an empty queue.
#[derive(Debug, Default)]
pub struct Queue {
    items: Vec<Track>,
    current_index: usize,
    source_tab: String,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue wholesale
    ///
    /// `start_at` must be in bounds of a non-empty list; replacing
    /// with an empty list is allowed and leaves the index meaningless.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start_at: usize) -> Result<(), EngineError> {
        if !tracks.is_empty() && start_at >= tracks.len() {
            return Err(EngineError::IndexOutOfRange {
                index: start_at,
                len: tracks.len(),
            });
        }
        self.items = tracks;
        self.current_index = start_at;
        Ok(())
    }

    /// The track under the cursor, if any
    pub fn current(&self) -> Option<&Track> {
        self.items.get(self.current_index)
    }

    /// Advance and return the new current track
    pub fn next(&mut self) -> Result<Track, EngineError> {
        if self.current_index + 1 >= self.items.len() {
            return Err(EngineError::EndOfQueue);
        }
        self.current_index += 1;
        Ok(self.items[self.current_index].clone())
    }

    /// Step back and return the new current track
    pub fn previous(&mut self) -> Result<Track, EngineError> {
        if self.items.is_empty() || self.current_index == 0 {
            return Err(EngineError::StartOfQueue);
        }
        self.current_index -= 1;
        Ok(self.items[self.current_index].clone())
    }

    /// Shuffle the queue, pinning the current track first
    pub fn shuffle(&mut self) {
        if self.items.len() < 2 {
            return;
        }
        self.items.swap(0, self.current_index);
        self.current_index = 0;
        self.items[1..].shuffle(&mut rand::thread_rng());
    }

    /// Group contiguous same-phase runs in queue order
    ///
    /// A phase change is a boundary, so `warmup, peak, warmup` yields
    /// three groups, not two.
    pub fn group_by_energy_phase(&self) -> Vec<PhaseGroup> {
        let mut groups: Vec<PhaseGroup> = Vec::new();
        for track in &self.items {
            match groups.last_mut() {
                Some(group) if group.phase == track.energy_phase => {
                    group.tracks.push(track.clone());
                }
                _ => groups.push(PhaseGroup {
                    phase: track.energy_phase,
                    tracks: vec![track.clone()],
                }),
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn set_source_tab(&mut self, tab: impl Into<String>) {
        self.source_tab = tab.into();
    }

    pub fn source_tab(&self) -> &str {
        &self.source_tab
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            items: self.items.clone(),
            current_index: self.current_index,
            source_tab: self.source_tab.clone(),
        }
    }
}
