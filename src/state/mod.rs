//! State management module for ScoreCast.
//!
//! This module provides the show engine and its surrounding plumbing:
//!
//! - `show` - Core data model (players, rounds, config, lifecycle status)
//! - `transitions` - Pure transition functions `(state, params) -> state'`
//! - `selectors` - Derived read-only views (totals, ranking, completion)
//! - `actions` - Serializable action surface over the transitions
//! - `rng` - Injectable randomness for reveal steps
//! - `scheduler` - Timer-driven reveal loop for custom-mode shows
//! - `persist` - Snapshot persistence behind a key-value store port
//! - `session` - Host-facing adapter wiring all of the above together
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           ShowSession                            │
//! │                                                                  │
//! │   ShowAction ──▶ apply_action ──▶ ShowState' ──┬──▶ ShowStore    │
//! │                      │                         │   (persisted    │
//! │                      ▼                         │    snapshot)    │
//! │                 transitions                    │                 │
//! │                                                ▼                 │
//! │   ┌──────────┐  schedule/cancel  ┌──────────────────────┐        │
//! │   │ TickTimer│◀─────────────────▶│       ShowLoop       │        │
//! │   └──────────┘    tick(..)       │  tick_custom_one_by_ │        │
//! │   ┌────────────┐                 │  one + next_player + │        │
//! │   │RandomSource│────────────────▶│  next_round          │        │
//! │   └────────────┘                 └──────────────────────┘        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use scorecast_state::state::{
//!     persist::MemoryStore,
//!     rng::SimpleRng,
//!     scheduler::ManualTimer,
//!     session::ShowSession,
//!     show::ShowMode,
//! };
//!
//! let mut session = ShowSession::new(
//!     Box::new(ManualTimer::new()),
//!     Box::new(SimpleRng::from_time()),
//!     Box::new(MemoryStore::new()),
//! );
//!
//! session.set_mode(ShowMode::Custom);
//! session.add_round();
//! session.add_player("Ada");
//! session.add_player("Grace");
//! session.set_planned_score("p1", 0, 10.0);
//! session.start_show();
//! session.resume_show();
//! ```

pub mod actions;
pub mod persist;
pub mod rng;
pub mod scheduler;
pub mod selectors;
pub mod session;
pub mod show;
pub mod transitions;

// Re-export commonly used types and entry points
pub use actions::{apply_action, ShowAction};
pub use persist::{
    load_show, save_show, validate_state, MemoryStore, PersistedLoop, PersistedLoopStatus,
    PersistedShow, ShowStore, SnapshotError, DEFAULT_STORAGE_KEY,
};
pub use rng::{RandomSource, SequenceSource, SimpleRng};
pub use scheduler::{
    LoopOptions, LoopStatus, ManualTimer, ShowLoop, TickOutcome, TickTimer, TimerHandle,
    DEFAULT_TICK_INTERVAL, DEFAULT_TICK_INTERVAL_MS,
};
pub use selectors::{
    is_current_player_finished, is_custom_round_finished, is_random_round_finished, ranking,
    total_score, RankedPlayer,
};
pub use session::ShowSession;
pub use show::{Player, Round, ShowConfig, ShowMode, ShowState, ShowStatus};
