//! Serializable action surface.
//!
//! Every mutation the engine supports is expressible as a [`ShowAction`],
//! so hosts can drive the state machine from a wire protocol, an event log,
//! or a UI dispatch layer without touching the transition functions
//! directly. Applying an action is exactly as forgiving as the underlying
//! transition: invalid actions return the input state unchanged.
//!
//! Actions serialize as tagged JSON objects:
//!
//! ```text
//! { "type": "SET_PLANNED_SCORE",
//!   "payload": { "playerId": "p1", "roundIndex": 0, "score": 5.0 } }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::persist::validate_state;
use crate::state::show::{ShowMode, ShowState};
use crate::state::transitions;

/// One engine mutation, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ShowAction {
    SetMode { mode: ShowMode },
    AddPlayer { name: String, avatar_url: String },
    RemovePlayer { player_id: String },
    RenamePlayer { player_id: String, name: String },
    SetPlayerAvatar { player_id: String, avatar_url: String },
    AddRound,
    RemoveRound { round_index: usize },
    SetPlannedScore { player_id: String, round_index: usize, score: f64 },
    StartShow,
    SetScoreRandom { player_id: String, score: f64 },
    NextRound,
    NextPlayer,
    FinishShow,
    ResetShow,
    /// Replace the whole state with a snapshot, typically one restored from
    /// persistence. Rejected unless the snapshot validates.
    LoadShow { state: ShowState },
}

impl ShowAction {
    /// Wire tag of this action, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ShowAction::SetMode { .. } => "SET_MODE",
            ShowAction::AddPlayer { .. } => "ADD_PLAYER",
            ShowAction::RemovePlayer { .. } => "REMOVE_PLAYER",
            ShowAction::RenamePlayer { .. } => "RENAME_PLAYER",
            ShowAction::SetPlayerAvatar { .. } => "SET_PLAYER_AVATAR",
            ShowAction::AddRound => "ADD_ROUND",
            ShowAction::RemoveRound { .. } => "REMOVE_ROUND",
            ShowAction::SetPlannedScore { .. } => "SET_PLANNED_SCORE",
            ShowAction::StartShow => "START_SHOW",
            ShowAction::SetScoreRandom { .. } => "SET_SCORE_RANDOM",
            ShowAction::NextRound => "NEXT_ROUND",
            ShowAction::NextPlayer => "NEXT_PLAYER",
            ShowAction::FinishShow => "FINISH_SHOW",
            ShowAction::ResetShow => "RESET_SHOW",
            ShowAction::LoadShow { .. } => "LOAD_SHOW",
        }
    }
}

/// Apply one action to a state snapshot.
///
/// Pure dispatch onto the transition functions; the scheduler tick is not an
/// action (it needs a randomness source and belongs to the loop, not the
/// reducer).
pub fn apply_action(state: &ShowState, action: &ShowAction) -> ShowState {
    match action {
        ShowAction::SetMode { mode } => transitions::set_mode(state, *mode),
        ShowAction::AddPlayer { name, avatar_url } => {
            transitions::add_player(state, name, avatar_url)
        }
        ShowAction::RemovePlayer { player_id } => transitions::remove_player(state, player_id),
        ShowAction::RenamePlayer { player_id, name } => {
            transitions::rename_player(state, player_id, name)
        }
        ShowAction::SetPlayerAvatar { player_id, avatar_url } => {
            transitions::set_player_avatar(state, player_id, avatar_url)
        }
        ShowAction::AddRound => transitions::add_round(state),
        ShowAction::RemoveRound { round_index } => transitions::remove_round(state, *round_index),
        ShowAction::SetPlannedScore { player_id, round_index, score } => {
            transitions::set_planned_score(state, player_id, *round_index, *score)
        }
        ShowAction::StartShow => transitions::start_show(state),
        ShowAction::SetScoreRandom { player_id, score } => {
            transitions::set_score_random(state, player_id, *score)
        }
        ShowAction::NextRound => transitions::next_round(state),
        ShowAction::NextPlayer => transitions::next_player(state),
        ShowAction::FinishShow => transitions::finish_show(state),
        ShowAction::ResetShow => transitions::reset_show_preserve_participants(state),
        ShowAction::LoadShow { state: snapshot } => {
            if validate_state(snapshot).is_ok() {
                snapshot.clone()
            } else {
                debug!("rejecting LOAD_SHOW with invalid snapshot");
                state.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::show::ShowStatus;
    use crate::state::transitions::{add_player, add_round, set_mode};

    fn make_editable_show() -> ShowState {
        let mut state = set_mode(&ShowState::initial(), ShowMode::Custom);
        state = add_round(&state);
        state = add_player(&state, "Ada", "");
        state = add_player(&state, "Grace", "");
        state
    }

    #[test]
    fn test_actions_match_direct_transitions() {
        let state = ShowState::initial();

        let via_action = apply_action(
            &state,
            &ShowAction::AddPlayer {
                name: "Ada".to_string(),
                avatar_url: String::new(),
            },
        );
        assert_eq!(via_action, add_player(&state, "Ada", ""));

        let via_action = apply_action(&via_action, &ShowAction::AddRound);
        assert_eq!(via_action.rounds.len(), 1);
        assert_eq!(via_action.players[0].planned_scores.len(), 1);
    }

    #[test]
    fn test_action_sequence_reaches_playing() {
        let mut state = ShowState::initial();
        let script = [
            ShowAction::SetMode { mode: ShowMode::Custom },
            ShowAction::AddRound,
            ShowAction::AddPlayer { name: "Ada".to_string(), avatar_url: String::new() },
            ShowAction::AddPlayer { name: "Grace".to_string(), avatar_url: String::new() },
            ShowAction::SetPlannedScore {
                player_id: "p1".to_string(),
                round_index: 0,
                score: 4.0,
            },
            ShowAction::StartShow,
        ];

        for action in &script {
            state = apply_action(&state, action);
        }
        assert_eq!(state.status, ShowStatus::Playing);
        assert_eq!(state.current_player_index, Some(0));
    }

    #[test]
    fn test_invalid_action_is_identity() {
        let state = make_editable_show();
        // One player is not enough to start.
        let lone = apply_action(
            &ShowState::initial(),
            &ShowAction::AddPlayer {
                name: "Solo".to_string(),
                avatar_url: String::new(),
            },
        );
        assert_eq!(apply_action(&lone, &ShowAction::StartShow), lone);

        // Removing an unknown round changes nothing.
        assert_eq!(
            apply_action(&state, &ShowAction::RemoveRound { round_index: 9 }),
            state
        );
    }

    #[test]
    fn test_load_show_accepts_valid_snapshot() {
        let snapshot = make_editable_show();
        let loaded = apply_action(&ShowState::initial(), &ShowAction::LoadShow {
            state: snapshot.clone(),
        });
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_load_show_rejects_invalid_snapshot() {
        let mut snapshot = make_editable_show();
        snapshot.players[0].planned_scores.clear();

        let state = ShowState::initial();
        let loaded = apply_action(&state, &ShowAction::LoadShow { state: snapshot });
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_action_wire_format() {
        let action = ShowAction::SetPlannedScore {
            player_id: "p1".to_string(),
            round_index: 0,
            score: 5.0,
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "SET_PLANNED_SCORE");
        assert_eq!(value["payload"]["playerId"], "p1");
        assert_eq!(value["payload"]["roundIndex"], 0);
        assert_eq!(value["payload"]["score"], 5.0);

        let parsed: ShowAction = serde_json::from_str(
            r#"{ "type": "SET_PLANNED_SCORE",
                 "payload": { "playerId": "p1", "roundIndex": 0, "score": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(parsed, action);
    }

    #[test]
    fn test_unit_action_wire_format() {
        let value = serde_json::to_value(ShowAction::StartShow).unwrap();
        assert_eq!(value["type"], "START_SHOW");

        let parsed: ShowAction = serde_json::from_str(r#"{ "type": "NEXT_ROUND" }"#).unwrap();
        assert_eq!(parsed, ShowAction::NextRound);
    }

    #[test]
    fn test_action_kind_labels() {
        assert_eq!(ShowAction::StartShow.kind(), "START_SHOW");
        assert_eq!(
            ShowAction::RemovePlayer { player_id: "p1".to_string() }.kind(),
            "REMOVE_PLAYER"
        );
    }
}
