//! Snapshot persistence.
//!
//! Shows survive host restarts through a key-value [`ShowStore`]. The
//! persisted payload bundles the state with the loop settings so a reopened
//! host can resume a reveal mid-round:
//!
//! ```text
//! { "state": { ... }, "loop": { "status": "paused", "tickIntervalMs": 300 } }
//! ```
//!
//! Loading is strict: a payload that fails to parse or validate is removed
//! and reads as absent, and a finished show is actively cleared rather than
//! stored. A corrupt snapshot can therefore never wedge a host; the worst
//! case is starting over from setup.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::scheduler::{LoopStatus, DEFAULT_TICK_INTERVAL_MS};
use crate::state::show::{ShowState, ShowStatus};

/// Store key under which the show snapshot lives by default.
pub const DEFAULT_STORAGE_KEY: &str = "scorecast-show";

/// Persisted bundle of show state plus loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedShow {
    pub state: ShowState,
    #[serde(rename = "loop")]
    pub loop_settings: PersistedLoop,
}

/// Loop portion of the persisted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLoop {
    pub status: PersistedLoopStatus,
    pub tick_interval_ms: u64,
}

impl Default for PersistedLoop {
    fn default() -> Self {
        Self {
            status: PersistedLoopStatus::Idle,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// Loop status values that survive a restart.
///
/// A stopped loop persists as idle. Any other string fails deserialization,
/// which discards the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistedLoopStatus {
    Running,
    Paused,
    #[default]
    Idle,
}

impl From<LoopStatus> for PersistedLoopStatus {
    fn from(status: LoopStatus) -> Self {
        match status {
            LoopStatus::Running => PersistedLoopStatus::Running,
            LoopStatus::Paused => PersistedLoopStatus::Paused,
            LoopStatus::Idle | LoopStatus::Stopped => PersistedLoopStatus::Idle,
        }
    }
}

/// Structural rule a decoded snapshot violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    RoundCountMismatch,
    RoundIndexMismatch,
    ScoreLengthMismatch,
    InvalidScore,
    CursorOutOfBounds,
    StatusCursorMismatch,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundCountMismatch => {
                write!(f, "Round list does not match the configured rounds count")
            }
            Self::RoundIndexMismatch => write!(f, "Round indices are not dense from zero"),
            Self::ScoreLengthMismatch => {
                write!(f, "Player score vectors do not match the round count")
            }
            Self::InvalidScore => write!(f, "Score is not a finite non-negative number"),
            Self::CursorOutOfBounds => write!(f, "Current index points outside the show"),
            Self::StatusCursorMismatch => {
                write!(f, "Current indices do not fit the show status")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Check a decoded state against the structural invariants before trusting
/// it. Returns the first violated rule.
pub fn validate_state(state: &ShowState) -> Result<(), SnapshotError> {
    if state.rounds.len() != state.config.rounds_count {
        return Err(SnapshotError::RoundCountMismatch);
    }
    for (position, round) in state.rounds.iter().enumerate() {
        if round.index != position {
            return Err(SnapshotError::RoundIndexMismatch);
        }
    }
    for player in &state.players {
        if player.planned_scores.len() != state.rounds.len()
            || player.current_scores.len() != state.rounds.len()
        {
            return Err(SnapshotError::ScoreLengthMismatch);
        }
        let scores = player.planned_scores.iter().chain(&player.current_scores);
        for score in scores {
            if !score.is_finite() || *score < 0.0 {
                return Err(SnapshotError::InvalidScore);
            }
        }
    }
    if let Some(round) = state.current_round_index {
        if round >= state.rounds.len() {
            return Err(SnapshotError::CursorOutOfBounds);
        }
    }
    if let Some(player) = state.current_player_index {
        if player >= state.players.len() {
            return Err(SnapshotError::CursorOutOfBounds);
        }
    }
    match state.status {
        ShowStatus::Setup | ShowStatus::Ready => {
            if state.current_round_index.is_some() || state.current_player_index.is_some() {
                return Err(SnapshotError::StatusCursorMismatch);
            }
        }
        ShowStatus::Playing => {
            if state.current_round_index.is_none() {
                return Err(SnapshotError::StatusCursorMismatch);
            }
        }
        ShowStatus::Finished => {
            if state.current_round_index.is_some() || state.current_player_index.is_some() {
                return Err(SnapshotError::StatusCursorMismatch);
            }
        }
    }
    Ok(())
}

/// Key-value port for snapshot storage.
///
/// Mirrors a browser localStorage surface so web-backed hosts map straight
/// onto it; anything keyed by string works.
pub trait ShowStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// HashMap-backed [`ShowStore`] for tests and headless hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ShowStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Load the persisted snapshot under `key`.
///
/// Anything short of a fully valid, unfinished snapshot reads as absent and
/// scrubs the key.
pub fn load_show(store: &mut dyn ShowStore, key: &str) -> Option<PersistedShow> {
    let raw = store.get(key)?;
    let persisted: PersistedShow = match serde_json::from_str(&raw) {
        Ok(persisted) => persisted,
        Err(err) => {
            warn!(%err, "discarding unreadable show snapshot");
            store.remove(key);
            return None;
        }
    };
    if let Err(err) = validate_state(&persisted.state) {
        warn!(%err, "discarding invalid show snapshot");
        store.remove(key);
        return None;
    }
    if persisted.state.status == ShowStatus::Finished {
        store.remove(key);
        return None;
    }
    Some(persisted)
}

/// Persist the snapshot under `key`, or clear the key for a finished show.
pub fn save_show(store: &mut dyn ShowStore, key: &str, payload: &PersistedShow) {
    if payload.state.status == ShowStatus::Finished {
        store.remove(key);
        return;
    }
    match serde_json::to_string(payload) {
        Ok(raw) => store.set(key, &raw),
        Err(err) => warn!(%err, "failed to serialize show snapshot"),
    }
}
