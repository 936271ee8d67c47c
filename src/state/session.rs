//! Show session, the host-facing adapter.
//!
//! [`ShowSession`] folds the pure pieces into one convenient owner: the
//! current [`ShowState`], the reveal loop, and the injected timer, randomness
//! and storage ports. Every mutation dispatches a [`ShowAction`], commits
//! only when the state actually changed, persists the committed payload, and
//! keeps the loop's working snapshot and lifecycle coupled to the show
//! status.
//!
//! ```text
//!            ┌─────────────────────────────────────────┐
//!            │               ShowSession               │
//!            │  ShowState ── apply_action ── persist   │
//!            │      │                          │       │
//!            │  ShowLoop ──── TickTimer    ShowStore   │
//!            │      │                                  │
//!            │  RandomSource                           │
//!            └─────────────────────────────────────────┘
//! ```
//!
//! Hosts that want finer control can use the transition functions, the loop
//! and the persistence helpers directly; the session just wires them the way
//! a typical frontend does.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use crate::state::actions::{apply_action, ShowAction};
use crate::state::persist::{
    load_show, save_show, PersistedLoop, PersistedLoopStatus, PersistedShow, ShowStore,
    DEFAULT_STORAGE_KEY,
};
use crate::state::rng::RandomSource;
use crate::state::scheduler::{
    LoopOptions, LoopStatus, ShowLoop, TickOutcome, TickTimer, DEFAULT_TICK_INTERVAL,
};
use crate::state::selectors;
use crate::state::show::{ShowMode, ShowState};

/// Owns one show end to end: state, reveal loop, and the host's ports.
pub struct ShowSession {
    state: ShowState,
    show_loop: Option<ShowLoop>,
    timer: Box<dyn TickTimer>,
    rng: Box<dyn RandomSource>,
    store: Box<dyn ShowStore>,
    storage_key: String,
    tick_interval: Duration,
    /// Loop status as reported to the host. Diverges from the actual loop
    /// right after hydration, when a persisted "paused" reads as paused even
    /// though the restored loop has not run yet.
    loop_status: LoopStatus,
    /// Player ids revealed in the current random-mode round.
    random_revealed: HashSet<String>,
}

impl ShowSession {
    /// Create a session hydrated from [`DEFAULT_STORAGE_KEY`].
    pub fn new(
        timer: Box<dyn TickTimer>,
        rng: Box<dyn RandomSource>,
        store: Box<dyn ShowStore>,
    ) -> Self {
        Self::with_key(timer, rng, store, DEFAULT_STORAGE_KEY)
    }

    /// Create a session hydrated from a caller-chosen store key.
    ///
    /// A persisted playing show gets its loop re-created; a persisted
    /// running loop is re-armed immediately, paused and idle ones wait for
    /// [`ShowSession::resume_show`].
    pub fn with_key(
        timer: Box<dyn TickTimer>,
        rng: Box<dyn RandomSource>,
        mut store: Box<dyn ShowStore>,
        storage_key: &str,
    ) -> Self {
        let persisted = load_show(store.as_mut(), storage_key);
        let mut session = Self {
            state: ShowState::initial(),
            show_loop: None,
            timer,
            rng,
            store,
            storage_key: storage_key.to_string(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            loop_status: LoopStatus::Idle,
            random_revealed: HashSet::new(),
        };

        if let Some(persisted) = persisted {
            session.tick_interval =
                Duration::from_millis(persisted.loop_settings.tick_interval_ms);
            session.state = persisted.state;
            debug!(
                status = session.state.status.as_str(),
                "restored persisted show"
            );
            if session.state.status.is_playing() {
                session.ensure_loop();
                match persisted.loop_settings.status {
                    PersistedLoopStatus::Running => session.run_loop(),
                    PersistedLoopStatus::Paused => session.loop_status = LoopStatus::Paused,
                    PersistedLoopStatus::Idle => session.loop_status = LoopStatus::Idle,
                }
            }
        }

        session
    }

    pub fn state(&self) -> &ShowState {
        &self.state
    }

    pub fn loop_status(&self) -> LoopStatus {
        self.loop_status
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// The backing store, for hosts that inspect or mirror the snapshot.
    pub fn store(&self) -> &dyn ShowStore {
        self.store.as_ref()
    }

    /// True once every player got a score this random-mode round.
    pub fn is_random_round_finished(&self) -> bool {
        selectors::is_random_round_finished(&self.state, &self.random_revealed)
    }

    pub fn set_mode(&mut self, mode: ShowMode) {
        self.dispatch(&ShowAction::SetMode { mode });
    }

    /// Add a player with an empty avatar; [`ShowSession::set_player_avatar`]
    /// fills it in later.
    pub fn add_player(&mut self, name: &str) {
        self.dispatch(&ShowAction::AddPlayer {
            name: name.to_string(),
            avatar_url: String::new(),
        });
    }

    pub fn remove_player(&mut self, player_id: &str) {
        self.dispatch(&ShowAction::RemovePlayer {
            player_id: player_id.to_string(),
        });
    }

    pub fn rename_player(&mut self, player_id: &str, name: &str) {
        self.dispatch(&ShowAction::RenamePlayer {
            player_id: player_id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn set_player_avatar(&mut self, player_id: &str, avatar_url: &str) {
        self.dispatch(&ShowAction::SetPlayerAvatar {
            player_id: player_id.to_string(),
            avatar_url: avatar_url.to_string(),
        });
    }

    pub fn add_round(&mut self) {
        self.dispatch(&ShowAction::AddRound);
    }

    pub fn remove_round(&mut self, round_index: usize) {
        self.dispatch(&ShowAction::RemoveRound { round_index });
    }

    pub fn set_planned_score(&mut self, player_id: &str, round_index: usize, score: f64) {
        self.dispatch(&ShowAction::SetPlannedScore {
            player_id: player_id.to_string(),
            round_index,
            score,
        });
    }

    /// Start the show. The reveal loop stays idle until
    /// [`ShowSession::resume_show`] kicks it off.
    pub fn start_show(&mut self) {
        if self.dispatch(&ShowAction::StartShow) && self.state.status.is_playing() {
            self.random_revealed.clear();
            self.loop_status = LoopStatus::Idle;
        }
    }

    /// Set a player's score for the current round (random mode) and record
    /// the player as revealed.
    pub fn set_score_random(&mut self, player_id: &str, score: f64) {
        // A repeat of the player's current score changes nothing yet still
        // counts as a reveal, so acceptance mirrors the transition's guards
        // instead of relying on change detection.
        let accepted = self.state.status.is_playing()
            && self.state.config.mode == ShowMode::Random
            && self.state.current_round_index.is_some()
            && score.is_finite()
            && score >= 0.0
            && self.state.has_player(player_id);

        self.dispatch(&ShowAction::SetScoreRandom {
            player_id: player_id.to_string(),
            score,
        });
        if accepted {
            self.random_revealed.insert(player_id.to_string());
        }
    }

    /// Advance to the next round and restart the reveal loop, or wind
    /// everything down when the show just finished.
    pub fn next_round(&mut self) {
        let changed = self.dispatch(&ShowAction::NextRound);
        if !self.state.status.is_playing() {
            self.stop_loop();
            self.loop_status = LoopStatus::Stopped;
            return;
        }
        if changed {
            self.random_revealed.clear();
            self.ensure_loop();
            self.run_loop();
        }
    }

    /// Suspend the reveal loop, keeping its progress, and persist.
    pub fn pause_show(&mut self) {
        if let Some(show_loop) = self.show_loop.as_mut() {
            show_loop.pause(&mut *self.timer);
            self.loop_status = show_loop.status();
        }
        self.persist();
    }

    /// Start or resume the reveal loop for a playing show.
    pub fn resume_show(&mut self) {
        if !self.state.status.is_playing() {
            return;
        }
        self.ensure_loop();
        self.run_loop();
        self.persist();
    }

    /// Halt and drop the reveal loop without touching the show state.
    pub fn stop_show(&mut self) {
        self.stop_loop();
        self.loop_status = LoopStatus::Stopped;
        self.persist();
    }

    /// End a playing show early.
    pub fn finish_show(&mut self) {
        if !self.state.status.is_playing() {
            return;
        }
        self.stop_loop();
        self.loop_status = LoopStatus::Stopped;
        self.dispatch(&ShowAction::FinishShow);
        self.random_revealed.clear();
    }

    /// Return to setup, keeping the roster and planned scores. Also restores
    /// the default tick interval.
    pub fn reset_show(&mut self) {
        self.stop_loop();
        self.tick_interval = DEFAULT_TICK_INTERVAL;
        self.dispatch(&ShowAction::ResetShow);
        self.random_revealed.clear();
        self.loop_status = LoopStatus::Idle;
    }

    /// Change the reveal tempo. Zero is rejected; a running loop re-arms at
    /// the new pace without losing progress.
    pub fn set_show_speed(&mut self, ms: u64) {
        if ms == 0 {
            return;
        }
        self.tick_interval = Duration::from_millis(ms);
        if let Some(show_loop) = self.show_loop.as_mut() {
            show_loop.set_tick_interval(&mut *self.timer, Duration::from_millis(ms));
            self.loop_status = show_loop.status();
        }
        self.persist();
    }

    /// Drive one fired wakeup through the loop, committing and persisting
    /// whatever it advanced.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(show_loop) = self.show_loop.as_mut() else {
            return TickOutcome::default();
        };
        let outcome = show_loop.tick(&mut *self.timer, &mut *self.rng);
        let loop_status = show_loop.status();
        let advanced = show_loop.state().clone();

        if outcome.state_changed {
            self.state = advanced;
            self.persist();
        } else if outcome.round_finished {
            self.persist();
        }

        if outcome.show_finished {
            self.stop_loop();
            self.loop_status = LoopStatus::Stopped;
        } else if !outcome.is_quiet() {
            self.loop_status = loop_status;
        }
        outcome
    }

    /// Fold one action into the state; on change, persist and re-sync the
    /// loop, stopping it if the show left `Playing`.
    fn dispatch(&mut self, action: &ShowAction) -> bool {
        let next = apply_action(&self.state, action);
        if next == self.state {
            return false;
        }
        self.state = next;
        if let Some(show_loop) = self.show_loop.as_mut() {
            show_loop.sync_state(self.state.clone());
        }
        if self.show_loop.is_some() && !self.state.status.is_playing() {
            self.stop_loop();
            self.loop_status = LoopStatus::Stopped;
        }
        self.persist();
        true
    }

    fn ensure_loop(&mut self) {
        if self.show_loop.is_none() {
            let options = LoopOptions {
                tick_interval: self.tick_interval,
                auto_next_round: false,
            };
            self.show_loop = Some(ShowLoop::new(self.state.clone(), options));
        }
        if let Some(show_loop) = self.show_loop.as_mut() {
            show_loop.sync_state(self.state.clone());
        }
    }

    /// Resume a paused loop, start it otherwise.
    fn run_loop(&mut self) {
        if let Some(show_loop) = self.show_loop.as_mut() {
            if show_loop.status().is_paused() {
                show_loop.resume(&mut *self.timer);
            } else {
                show_loop.start(&mut *self.timer);
            }
            self.loop_status = show_loop.status();
        }
    }

    fn stop_loop(&mut self) {
        if let Some(mut show_loop) = self.show_loop.take() {
            show_loop.stop(&mut *self.timer);
        }
    }

    fn persist(&mut self) {
        let payload = PersistedShow {
            state: self.state.clone(),
            loop_settings: self.persisted_loop(),
        };
        save_show(self.store.as_mut(), &self.storage_key, &payload);
    }

    fn persisted_loop(&self) -> PersistedLoop {
        let status = self
            .show_loop
            .as_ref()
            .map(|show_loop| show_loop.status())
            .unwrap_or(LoopStatus::Idle);
        PersistedLoop {
            status: status.into(),
            tick_interval_ms: self.tick_interval.as_millis() as u64,
        }
    }
}

impl Drop for ShowSession {
    /// Best-effort final write, the shutdown counterpart of per-commit
    /// persistence.
    fn drop(&mut self) {
        self.persist();
    }
}
