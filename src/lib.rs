//! ScoreCast State Library
//!
//! This crate provides state management for ScoreCast show logic.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Show Engine** - An immutable state machine for a multi-round scoring
//!   show: roster and round editing, readiness derivation, and the playing
//!   lifecycle, all as pure transition functions.
//!
//! - **Reveal Scheduler** - A timer-driven loop that animates custom-mode
//!   reveals, counting each player's score up toward its planned target in
//!   randomized steps.
//!
//! - **Selectors** - Totals, competition-style ranking with tie handling,
//!   and round/player completion predicates.
//!
//! - **Persistence** - Best-effort snapshotting of state plus loop settings
//!   behind a key-value store port, with strict validation on load.
//!
//! # Design Principles
//!
//! 1. **Pure transitions** - Every mutation returns a brand-new snapshot;
//!    invalid operations return the input unchanged instead of failing.
//!
//! 2. **Injected time and randomness** - The scheduler never touches a
//!    clock or RNG directly; timer and randomness ports keep reveals
//!    reproducible under test.
//!
//! 3. **No I/O** - This crate is pure state, no rendering, networking, or
//!    storage backends; hosts plug those in at the ports.
//!
//! 4. **Serialization-ready** - Snapshots and actions carry a stable
//!    camelCase JSON wire format.
//!
//! # Example
//!
//! ```rust
//! use scorecast_state::state::{
//!     ShowMode, ShowSession,
//!     persist::MemoryStore,
//!     rng::SimpleRng,
//!     scheduler::ManualTimer,
//! };
//!
//! let mut session = ShowSession::new(
//!     Box::new(ManualTimer::new()),
//!     Box::new(SimpleRng::new(7)),
//!     Box::new(MemoryStore::new()),
//! );
//!
//! // Configure a two-player custom show with one round.
//! session.set_mode(ShowMode::Custom);
//! session.add_round();
//! session.add_player("Ada");
//! session.add_player("Grace");
//! session.set_planned_score("p1", 0, 10.0);
//! session.set_planned_score("p2", 0, 6.0);
//!
//! // Start it and animate the reveal to completion.
//! session.start_show();
//! session.resume_show();
//! while !session.tick().round_finished {}
//!
//! assert_eq!(session.state().players[0].current_scores[0], 10.0);
//! assert_eq!(session.state().players[1].current_scores[0], 6.0);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
