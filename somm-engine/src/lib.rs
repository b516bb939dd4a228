//! SOMM playback engine
//!
//! Orchestrates two virtual decks behind a crossfade controller, keeps
//! the ordered play queue, and drives automatic transitions from an
//! explicit ticker thread. Actual audio output is delegated to the
//! host through the [`Playback`] capability trait; this crate only
//! decides *when* and *how* a deck swap happens.

pub mod crossfade;
pub mod deck;
pub mod error;
pub mod playback;
pub mod queue;
pub mod session;

pub use crossfade::{CrossfadeConfig, CrossfadeSnapshot, Crossfader, TransitionMode};
pub use deck::{Deck, DeckSide, DeckSnapshot, PlayState};
pub use error::EngineError;
pub use playback::Playback;
pub use queue::{PhaseGroup, Queue, QueueSnapshot};
pub use session::{spawn_ticker, PlayerSession, SessionEvent, TickerHandle};
