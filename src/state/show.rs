//! Show domain model.
//!
//! The single source of truth is [`ShowState`]: one show at a time, evolved
//! exclusively by the pure functions in [`crate::state::transitions`].
//! Snapshots are replaced whole, never mutated in place, so hosts can detect
//! change by comparing the returned state with the input.
//!
//! # Status Diagram
//!
//! ```text
//!            edits recompute status
//!          ┌──────────────────────┐
//!          ▼                      │
//!    ┌──────────┐           ┌──────────┐
//!    │  Setup   │◀─────────▶│  Ready   │
//!    └────┬─────┘           └────┬─────┘
//!         ▲                      │ start_show
//!         │                      ▼
//!         │                ┌──────────┐
//!         │   reset        │ Playing  │──┐ next_round
//!         │                └────┬─────┘◀─┘ (while rounds remain)
//!         │                     │ next_round past the last round,
//!         │                     │ or finish_show
//!         │                     ▼
//!         │                ┌──────────┐
//!         └────────────────│ Finished │
//!                          └──────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Reveal mode for a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowMode {
    /// Scores are entered directly while playing and revealed instantly.
    #[default]
    Random,
    /// Scores animate toward pre-planned targets, one player at a time.
    Custom,
}

impl ShowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Custom => "custom",
        }
    }
}

/// Show lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    /// Being configured; start preconditions not yet satisfied
    #[default]
    Setup,
    /// Configuration satisfies all start preconditions
    Ready,
    /// Show in progress
    Playing,
    /// Show completed (normally or by early termination)
    Finished,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }

    /// Check if roster/round/score edits are allowed.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Setup | Self::Ready)
    }

    /// Check if the show is in progress.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if the show has ended (immutable-at-rest except for reset).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Show configuration chosen during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowConfig {
    /// Reveal mode
    pub mode: ShowMode,

    /// Number of rounds; equals `rounds.len()` whenever the show is editable
    pub rounds_count: usize,
}

/// A show participant.
///
/// Score vectors always carry one slot per round. `planned_scores` holds the
/// custom-mode targets; `current_scores` holds the revealed values, which in
/// custom mode never exceed the corresponding planned score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Opaque stable identifier, unique within the roster
    pub id: String,

    /// Display name (free text)
    pub name: String,

    /// Avatar URL; validity is judged by the display layer, not the engine
    pub avatar_url: String,

    /// Custom-mode target per round
    pub planned_scores: Vec<f64>,

    /// Revealed/accumulated value per round
    pub current_scores: Vec<f64>,
}

impl Player {
    /// Create a player with zero-filled score vectors sized to `rounds_len`.
    pub fn new(id: String, name: String, avatar_url: String, rounds_len: usize) -> Self {
        Self {
            id,
            name,
            avatar_url,
            planned_scores: vec![0.0; rounds_len],
            current_scores: vec![0.0; rounds_len],
        }
    }
}

/// One scoring unit of a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// 0-based position, dense across `rounds`
    pub index: usize,

    /// Exactly one round is active while the show is playing, else none
    pub is_active: bool,

    /// True for all rounds before the current one, and for every round once
    /// the show is finished
    pub is_finished: bool,
}

impl Round {
    /// Create an inactive, unfinished round at `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            is_active: false,
            is_finished: false,
        }
    }
}

/// Complete show state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowState {
    /// Current lifecycle status
    pub status: ShowStatus,

    /// Mode and declared round count
    pub config: ShowConfig,

    /// Ordered roster; ids are unique
    pub players: Vec<Player>,

    /// Ordered rounds, densely indexed from 0
    pub rounds: Vec<Round>,

    /// Index of the active round; `Some` only while playing
    pub current_round_index: Option<usize>,

    /// Index of the player currently revealing; `Some` only while playing
    /// in custom mode
    pub current_player_index: Option<usize>,
}

impl ShowState {
    /// Create a fresh show: empty roster, no rounds, random mode, setup.
    pub fn initial() -> Self {
        Self {
            status: ShowStatus::Setup,
            config: ShowConfig::default(),
            players: Vec::new(),
            rounds: Vec::new(),
            current_round_index: None,
            current_player_index: None,
        }
    }

    /// Look up a player by id.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Check if a player is on the roster.
    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    /// Roster size.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The round currently being played, if any.
    pub fn current_round(&self) -> Option<&Round> {
        self.current_round_index.and_then(|i| self.rounds.get(i))
    }

    /// The player currently revealing, if any.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_index.and_then(|i| self.players.get(i))
    }
}

impl Default for ShowState {
    fn default() -> Self {
        Self::initial()
    }
}
