//! Background assembly worker with stale-request discard
//!
//! Assembly hits external sources and must stay off the playback
//! path. Requests go to a dedicated thread over a channel; each one
//! carries a generation number drawn from a shared counter. When the
//! user changes the request mid-fetch the counter moves on, and any
//! result finishing under an old generation is dropped before it can
//! overwrite the current batch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::assembler::{Assembler, RecommendationRequest, RecommendationResult};
use crate::sources::RecsError;

const REQUEST_CHANNEL_CAPACITY: usize = 64;
const RESULT_CHANNEL_CAPACITY: usize = 64;

/// A finished batch, tagged with the generation that produced it
#[derive(Debug, Clone)]
pub struct WorkerOutput {
    pub generation: u64,
    pub result: RecommendationResult,
}

/// Handle to the assembly thread
pub struct RecsWorker {
    generation: Arc<AtomicU64>,
    request_tx: Sender<(u64, RecommendationRequest)>,
    handle: JoinHandle<()>,
}

impl RecsWorker {
    /// Queue a request, superseding any still in flight
    ///
    /// Returns the generation the eventual result will carry.
    pub fn submit(&self, request: RecommendationRequest) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.request_tx.send((generation, request));
        generation
    }

    /// The generation of the most recent submission
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Check that a received batch is still the newest one
    ///
    /// Outputs can sit in the result channel across a resubmission, so
    /// hosts verify the tag once more before applying a batch.
    pub fn ensure_current(&self, generation: u64) -> Result<(), RecsError> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            Err(RecsError::StaleRequest)
        }
    }

    /// Close the request channel and wait for the thread to drain
    pub fn stop(self) {
        drop(self.request_tx);
        let _ = self.handle.join();
    }
}

/// Spawn the worker around an assembler
pub fn spawn_worker(assembler: Assembler) -> (RecsWorker, Receiver<WorkerOutput>) {
    let (request_tx, request_rx) = bounded::<(u64, RecommendationRequest)>(REQUEST_CHANNEL_CAPACITY);
    let (result_tx, result_rx) = bounded::<WorkerOutput>(RESULT_CHANNEL_CAPACITY);
    let generation = Arc::new(AtomicU64::new(0));
    let counter = generation.clone();

    let handle = thread::spawn(move || {
        while let Ok((gen, request)) = request_rx.recv() {
            // A newer submission may already have superseded this one;
            // skip the fetch entirely.
            if counter.load(Ordering::SeqCst) != gen {
                tracing::debug!(generation = gen, "skipping superseded request");
                continue;
            }
            let result = assembler.assemble(&request);
            if counter.load(Ordering::SeqCst) != gen {
                tracing::debug!(generation = gen, "discarding stale result");
                continue;
            }
            let _ = result_tx.send(WorkerOutput {
                generation: gen,
                result,
            });
        }
    });

    (
        RecsWorker {
            generation,
            request_tx,
            handle,
        },
        result_rx,
    )
}
