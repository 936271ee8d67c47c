//! Derived read-only views over [`ShowState`].
//!
//! Selectors never mutate and never fail; malformed input simply reads as
//! "not finished" or an empty ranking. They are cheap enough to recompute on
//! every render or tick.

use std::collections::HashSet;

use crate::state::show::{Player, ShowMode, ShowState};

/// Sum of a player's revealed scores across all rounds.
pub fn total_score(player: &Player) -> f64 {
    player.current_scores.iter().sum()
}

/// One row of [`ranking`].
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    pub player_id: String,
    pub name: String,
    pub total_score: f64,
    /// Competition place: tied totals share a place and the next distinct
    /// total takes its 1-based position (1, 2, 2, 4).
    pub place: usize,
}

/// Rank players by descending revealed total.
///
/// Ties share a place and keep roster order among themselves.
pub fn ranking(state: &ShowState) -> Vec<RankedPlayer> {
    let mut rows: Vec<RankedPlayer> = state
        .players
        .iter()
        .map(|player| RankedPlayer {
            player_id: player.id.clone(),
            name: player.name.clone(),
            total_score: total_score(player),
            place: 1,
        })
        .collect();

    // Stable sort keeps roster order among equal totals.
    rows.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

    let mut place = 1;
    let mut last_score: Option<f64> = None;
    for (i, row) in rows.iter_mut().enumerate() {
        if let Some(last) = last_score {
            if row.total_score < last {
                place = i + 1;
            }
        }
        last_score = Some(row.total_score);
        row.place = place;
    }

    rows
}

/// True once every player's current-round score has reached its planned
/// score, i.e. the round's reveal is complete.
///
/// Only meaningful for custom-mode shows that are playing; anything else
/// reads as `false`.
pub fn is_custom_round_finished(state: &ShowState) -> bool {
    if !state.status.is_playing() || state.config.mode != ShowMode::Custom {
        return false;
    }
    let Some(round) = state.current_round_index else {
        return false;
    };
    state.players.iter().all(|player| {
        match (player.current_scores.get(round), player.planned_scores.get(round)) {
            (Some(current), Some(target)) => current == target,
            _ => false,
        }
    })
}

/// True while the reveal cursor points at a player whose current-round score
/// has reached its planned score.
pub fn is_current_player_finished(state: &ShowState) -> bool {
    let (Some(round), Some(index)) = (state.current_round_index, state.current_player_index) else {
        return false;
    };
    let Some(player) = state.players.get(index) else {
        return false;
    };
    match (player.current_scores.get(round), player.planned_scores.get(round)) {
        (Some(current), Some(target)) => current == target,
        _ => false,
    }
}

/// Random-mode analogue of [`is_custom_round_finished`].
///
/// Random-mode scores arrive from outside the state machine, so "everyone
/// has been revealed" is not derivable from [`ShowState`] alone. The caller
/// passes the player ids it has recorded for the current round; the session
/// keeps that set and clears it when the round advances.
pub fn is_random_round_finished(state: &ShowState, revealed: &HashSet<String>) -> bool {
    if !state.status.is_playing() || state.config.mode != ShowMode::Random {
        return false;
    }
    if state.current_round_index.is_none() {
        return false;
    }
    state.players.iter().all(|player| revealed.contains(&player.id))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::show::{ShowConfig, ShowStatus};

    fn make_player(id: &str, current_scores: Vec<f64>) -> Player {
        let rounds = current_scores.len();
        Player {
            id: id.to_string(),
            name: format!("Player {id}"),
            avatar_url: String::new(),
            planned_scores: vec![0.0; rounds],
            current_scores,
        }
    }

    fn make_state(mode: ShowMode, players: Vec<Player>) -> ShowState {
        let rounds_count = players.first().map_or(0, |p| p.current_scores.len());
        let mut state = ShowState::initial();
        state.status = ShowStatus::Playing;
        state.config = ShowConfig { mode, rounds_count };
        state.players = players;
        state.current_round_index = Some(0);
        state
    }

    #[test]
    fn test_total_score_sums_revealed() {
        let player = make_player("p1", vec![1.0, 2.5, 3.0]);
        assert_eq!(total_score(&player), 6.5);
    }

    #[test]
    fn test_total_score_empty_is_zero() {
        let player = make_player("p1", Vec::new());
        assert_eq!(total_score(&player), 0.0);
    }

    #[test]
    fn test_ranking_orders_by_total_descending() {
        let state = make_state(
            ShowMode::Custom,
            vec![
                make_player("p1", vec![1.0, 2.0]),
                make_player("p2", vec![4.0, 4.0]),
                make_player("p3", vec![0.0, 5.0]),
            ],
        );

        let rows = ranking(&state);
        let ids: Vec<&str> = rows.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3", "p1"]);
        assert_eq!(rows[0].place, 1);
        assert_eq!(rows[1].place, 2);
        assert_eq!(rows[2].place, 3);
    }

    #[test]
    fn test_ranking_ties_share_place_and_skip() {
        let state = make_state(
            ShowMode::Custom,
            vec![
                make_player("p1", vec![10.0]),
                make_player("p2", vec![10.0]),
                make_player("p3", vec![5.0]),
            ],
        );

        let rows = ranking(&state);
        assert_eq!(rows[0].place, 1);
        assert_eq!(rows[1].place, 1);
        assert_eq!(rows[2].place, 3);
    }

    #[test]
    fn test_ranking_ties_keep_roster_order() {
        let state = make_state(
            ShowMode::Custom,
            vec![
                make_player("p3", vec![5.0]),
                make_player("p1", vec![10.0]),
                make_player("p2", vec![10.0]),
            ],
        );

        let rows = ranking(&state);
        let ids: Vec<&str> = rows.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_ranking_empty_roster() {
        let state = make_state(ShowMode::Custom, Vec::new());
        assert_eq!(ranking(&state), Vec::new());
    }

    #[test]
    fn test_custom_round_finished_when_all_reach_targets() {
        let mut state = make_state(
            ShowMode::Custom,
            vec![make_player("p1", vec![3.0]), make_player("p2", vec![7.0])],
        );
        state.players[0].planned_scores = vec![3.0];
        state.players[1].planned_scores = vec![7.0];

        assert!(is_custom_round_finished(&state));
    }

    #[test]
    fn test_custom_round_not_finished_while_any_short() {
        let mut state = make_state(
            ShowMode::Custom,
            vec![make_player("p1", vec![3.0]), make_player("p2", vec![6.0])],
        );
        state.players[0].planned_scores = vec![3.0];
        state.players[1].planned_scores = vec![7.0];

        assert!(!is_custom_round_finished(&state));
    }

    #[test]
    fn test_custom_round_finished_requires_playing_custom() {
        let mut state = make_state(ShowMode::Random, vec![make_player("p1", vec![0.0])]);
        assert!(!is_custom_round_finished(&state));

        state.config.mode = ShowMode::Custom;
        state.status = ShowStatus::Finished;
        assert!(!is_custom_round_finished(&state));

        state.status = ShowStatus::Playing;
        state.current_round_index = None;
        assert!(!is_custom_round_finished(&state));
    }

    #[test]
    fn test_current_player_finished_tracks_cursor() {
        let mut state = make_state(
            ShowMode::Custom,
            vec![make_player("p1", vec![3.0]), make_player("p2", vec![1.0])],
        );
        state.players[0].planned_scores = vec![3.0];
        state.players[1].planned_scores = vec![7.0];

        state.current_player_index = Some(0);
        assert!(is_current_player_finished(&state));

        state.current_player_index = Some(1);
        assert!(!is_current_player_finished(&state));
    }

    #[test]
    fn test_current_player_finished_needs_cursor() {
        let mut state = make_state(ShowMode::Custom, vec![make_player("p1", vec![0.0])]);
        state.current_player_index = None;
        assert!(!is_current_player_finished(&state));

        state.current_player_index = Some(5);
        assert!(!is_current_player_finished(&state));
    }

    #[test]
    fn test_random_round_finished_tracks_revealed_set() {
        let state = make_state(
            ShowMode::Random,
            vec![make_player("p1", vec![0.0]), make_player("p2", vec![0.0])],
        );

        let mut revealed = HashSet::new();
        revealed.insert("p1".to_string());
        assert!(!is_random_round_finished(&state, &revealed));

        revealed.insert("p2".to_string());
        assert!(is_random_round_finished(&state, &revealed));
    }

    #[test]
    fn test_random_round_finished_requires_playing_random() {
        let state = make_state(ShowMode::Custom, vec![make_player("p1", vec![0.0])]);
        let mut revealed = HashSet::new();
        revealed.insert("p1".to_string());
        assert!(!is_random_round_finished(&state, &revealed));
    }
}
