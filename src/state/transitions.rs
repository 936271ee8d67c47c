//! Pure show transitions.
//!
//! Every mutation of a [`ShowState`] goes through a function in this module.
//! All of them are total: given the same input state and arguments they
//! produce the same result, and a rejected transition (wrong status, wrong
//! mode, out-of-range index, non-finite or negative score) returns the input
//! state unchanged instead of signalling an error. Callers that care can
//! detect rejection by comparing the returned snapshot against the input.
//!
//! Status is never hand-set by roster/round/score edits; each of them ends
//! by re-deriving `Setup`/`Ready` from the start preconditions. Only
//! [`start_show`], [`next_round`], [`finish_show`] and
//! [`reset_show_preserve_participants`] move the status anywhere else.

use crate::state::rng::RandomSource;
use crate::state::show::{Player, Round, ShowMode, ShowState, ShowStatus};

/// Check whether the show satisfies every start precondition.
///
/// True iff the roster has at least 2 players, at least one round exists,
/// the declared round count matches, every player's score vectors are sized
/// to the round count, and (custom mode only) every planned score is finite
/// and non-negative.
pub fn can_start(state: &ShowState) -> bool {
    state.status.is_editable() && start_conditions_met(state)
}

/// Re-derive `Setup`/`Ready` from the start preconditions.
///
/// No-op unless the show is editable; `Playing` and `Finished` are owned by
/// the lifecycle transitions.
pub fn recompute_status(state: &ShowState) -> ShowState {
    recomputed(state.clone())
}

/// Set the reveal mode, resetting rounds and every player's score vectors.
pub fn set_mode(state: &ShowState, mode: ShowMode) -> ShowState {
    if !state.status.is_editable() {
        return state.clone();
    }

    let mut next = state.clone();
    next.config.mode = mode;
    next.config.rounds_count = 0;
    next.rounds.clear();
    next.current_round_index = None;
    next.current_player_index = None;
    for player in &mut next.players {
        player.planned_scores.clear();
        player.current_scores.clear();
    }

    recomputed(next)
}

/// Append a player with zero-filled score vectors sized to the round count.
pub fn add_player(state: &ShowState, name: &str, avatar_url: &str) -> ShowState {
    if !state.status.is_editable() {
        return state.clone();
    }

    let mut next = state.clone();
    let id = next_player_id(&next.players);
    next.players.push(Player::new(
        id,
        name.to_string(),
        avatar_url.to_string(),
        next.rounds.len(),
    ));

    recomputed(next)
}

/// Remove the player with the given id.
pub fn remove_player(state: &ShowState, player_id: &str) -> ShowState {
    if !state.status.is_editable() {
        return state.clone();
    }

    let mut next = state.clone();
    next.players.retain(|p| p.id != player_id);

    recomputed(next)
}

/// Replace a player's display name.
pub fn rename_player(state: &ShowState, player_id: &str, name: &str) -> ShowState {
    if !state.status.is_editable() {
        return state.clone();
    }

    let mut next = state.clone();
    for player in &mut next.players {
        if player.id == player_id {
            player.name = name.to_string();
        }
    }

    recomputed(next)
}

/// Replace a player's avatar URL. Does not affect readiness.
pub fn set_player_avatar(state: &ShowState, player_id: &str, avatar_url: &str) -> ShowState {
    if !state.status.is_editable() {
        return state.clone();
    }

    let mut next = state.clone();
    for player in &mut next.players {
        if player.id == player_id {
            player.avatar_url = avatar_url.to_string();
        }
    }

    next
}

/// Append one round and a zero score slot for every player.
pub fn add_round(state: &ShowState) -> ShowState {
    if !state.status.is_editable() {
        return state.clone();
    }

    let mut next = state.clone();
    next.rounds.push(Round::new(next.rounds.len()));
    next.config.rounds_count += 1;
    for player in &mut next.players {
        player.planned_scores.push(0.0);
        player.current_scores.push(0.0);
    }

    recomputed(next)
}

/// Remove one round, re-indexing the remainder densely from 0 and dropping
/// the corresponding score slot from every player.
pub fn remove_round(state: &ShowState, round_index: usize) -> ShowState {
    if !state.status.is_editable() || round_index >= state.rounds.len() {
        return state.clone();
    }

    let mut next = state.clone();
    next.rounds.remove(round_index);
    for (i, round) in next.rounds.iter_mut().enumerate() {
        round.index = i;
    }
    next.config.rounds_count = next.rounds.len();
    for player in &mut next.players {
        if round_index < player.planned_scores.len() {
            player.planned_scores.remove(round_index);
        }
        if round_index < player.current_scores.len() {
            player.current_scores.remove(round_index);
        }
    }

    recomputed(next)
}

/// Overwrite a player's planned score for one round (custom mode only).
pub fn set_planned_score(
    state: &ShowState,
    player_id: &str,
    round_index: usize,
    score: f64,
) -> ShowState {
    if !state.status.is_editable()
        || state.config.mode != ShowMode::Custom
        || round_index >= state.rounds.len()
        || !score.is_finite()
        || score < 0.0
    {
        return state.clone();
    }

    let mut next = state.clone();
    for player in &mut next.players {
        if player.id == player_id {
            if let Some(slot) = player.planned_scores.get_mut(round_index) {
                *slot = score;
            }
        }
    }

    recomputed(next)
}

/// Start the show: zero every current score, activate round 0 and, in
/// custom mode, point the reveal cursor at the first player.
pub fn start_show(state: &ShowState) -> ShowState {
    if !can_start(state) {
        return state.clone();
    }

    let mut next = state.clone();
    next.status = ShowStatus::Playing;
    next.current_round_index = Some(0);
    next.current_player_index = match next.config.mode {
        ShowMode::Custom => Some(0),
        ShowMode::Random => None,
    };
    for (i, round) in next.rounds.iter_mut().enumerate() {
        round.is_active = i == 0;
        round.is_finished = false;
    }
    for player in &mut next.players {
        for score in &mut player.current_scores {
            *score = 0.0;
        }
    }

    next
}

/// Set a player's score for the current round directly (random mode only).
pub fn set_score_random(state: &ShowState, player_id: &str, score: f64) -> ShowState {
    if !state.status.is_playing()
        || state.config.mode != ShowMode::Random
        || !score.is_finite()
        || score < 0.0
    {
        return state.clone();
    }
    let Some(round_index) = state.current_round_index else {
        return state.clone();
    };

    let mut next = state.clone();
    for player in &mut next.players {
        if player.id == player_id {
            if let Some(slot) = player.current_scores.get_mut(round_index) {
                *slot = score;
            }
        }
    }

    next
}

/// Advance one scheduler step: move the current player's score one randomized
/// increment toward its planned target (custom mode only).
pub fn tick_custom_one_by_one(state: &ShowState, rng: &mut dyn RandomSource) -> ShowState {
    if !state.status.is_playing() || state.config.mode != ShowMode::Custom {
        return state.clone();
    }
    let (Some(round_index), Some(player_index)) =
        (state.current_round_index, state.current_player_index)
    else {
        return state.clone();
    };
    let Some(player) = state.players.get(player_index) else {
        return state.clone();
    };
    let (Some(&current), Some(&target)) = (
        player.current_scores.get(round_index),
        player.planned_scores.get(round_index),
    ) else {
        return state.clone();
    };

    let next_value = calculate_next_towards_target(current, target, rng);
    if next_value == current {
        return state.clone();
    }

    let mut next = state.clone();
    next.players[player_index].current_scores[round_index] = next_value;
    next
}

/// Compute the next revealed value on the way from `current` to `target`.
///
/// Closes at least 1 and at most `ceil(remaining / 3)` of the remaining gap
/// per call, never overshoots, and returns `target` unchanged once reached.
pub fn calculate_next_towards_target(
    current: f64,
    target: f64,
    rng: &mut dyn RandomSource,
) -> f64 {
    if current >= target {
        return target;
    }

    let remaining = target - current;
    let max_step = (remaining / 3.0).ceil().max(1.0);
    let step = (rng.next_unit() * max_step).floor() + 1.0;

    (current + step).min(target)
}

/// Advance to the next round, or finish the show when none remains.
pub fn next_round(state: &ShowState) -> ShowState {
    if !state.status.is_playing() {
        return state.clone();
    }
    let Some(current) = state.current_round_index else {
        return state.clone();
    };

    let next_index = current + 1;
    let mut next = state.clone();

    if next_index >= next.rounds.len() {
        next.status = ShowStatus::Finished;
        next.current_round_index = None;
        next.current_player_index = None;
        for round in &mut next.rounds {
            round.is_active = false;
            round.is_finished = true;
        }
        return next;
    }

    next.current_round_index = Some(next_index);
    next.current_player_index = match next.config.mode {
        ShowMode::Custom => Some(0),
        ShowMode::Random => None,
    };
    for (i, round) in next.rounds.iter_mut().enumerate() {
        round.is_active = i == next_index;
        round.is_finished = i < next_index;
    }
    next
}

/// Advance the reveal cursor to the next player, or clear it once the roster
/// is exhausted (signalling the round's reveal queue is done).
pub fn next_player(state: &ShowState) -> ShowState {
    let Some(current) = state.current_player_index else {
        return state.clone();
    };

    let mut next = state.clone();
    let next_index = current + 1;
    next.current_player_index = if next_index >= next.players.len() {
        None
    } else {
        Some(next_index)
    };
    next
}

/// Force the show to `Finished`, clearing the current indices. Used for
/// early termination.
pub fn finish_show(state: &ShowState) -> ShowState {
    if !state.status.is_playing() {
        return state.clone();
    }

    let mut next = state.clone();
    next.status = ShowStatus::Finished;
    next.current_round_index = None;
    next.current_player_index = None;
    for round in &mut next.rounds {
        round.is_active = false;
        round.is_finished = true;
    }
    next
}

/// Return to `Setup`, keeping the roster and planned scores but zeroing every
/// revealed score and resetting round flags. Valid from any status.
pub fn reset_show_preserve_participants(state: &ShowState) -> ShowState {
    let mut next = state.clone();
    next.status = ShowStatus::Setup;
    next.current_round_index = None;
    next.current_player_index = None;
    next.config.rounds_count = next.rounds.len();
    for (i, round) in next.rounds.iter_mut().enumerate() {
        round.index = i;
        round.is_active = false;
        round.is_finished = false;
    }
    let rounds_len = next.rounds.len();
    for player in &mut next.players {
        player.current_scores = vec![0.0; rounds_len];
    }
    next
}

/// Start preconditions minus the status check (shared by [`can_start`] and
/// [`recompute_status`]).
fn start_conditions_met(state: &ShowState) -> bool {
    if state.players.len() < 2 {
        return false;
    }
    if state.rounds.is_empty() {
        return false;
    }
    if state.rounds.len() != state.config.rounds_count {
        return false;
    }

    let lengths_ok = state.players.iter().all(|p| {
        p.planned_scores.len() == state.rounds.len()
            && p.current_scores.len() == state.rounds.len()
    });
    if !lengths_ok {
        return false;
    }

    if state.config.mode == ShowMode::Custom {
        return state
            .players
            .iter()
            .all(|p| p.planned_scores.iter().all(|n| n.is_finite() && *n >= 0.0));
    }

    true
}

fn recomputed(mut state: ShowState) -> ShowState {
    if state.status.is_editable() {
        state.status = if start_conditions_met(&state) {
            ShowStatus::Ready
        } else {
            ShowStatus::Setup
        };
    }
    state
}

/// Derive the next free player id from the roster.
///
/// Ids are `p1`, `p2`, ... with the counter one past the highest suffix in
/// use, so the function stays pure and ids never collide within a roster.
fn next_player_id(players: &[Player]) -> String {
    let max_suffix = players
        .iter()
        .filter_map(|p| p.id.strip_prefix('p'))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("p{}", max_suffix + 1)
}
