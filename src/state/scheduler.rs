//! Reveal scheduler.
//!
//! [`ShowLoop`] animates custom-mode reveals. While running it advances the
//! current player's score by one randomized step per tick, moves the reveal
//! cursor across the roster as players reach their targets, and optionally
//! rolls straight into the next round.
//!
//! ## Status Diagram
//!
//! ```text
//! idle ──start──▶ running ──pause──▶ paused
//!                 ▲  │ ▲               │
//!                 │  │ └────resume─────┘
//!               start │
//!                 │  stop
//!                 │  ▼
//!               stopped
//! ```
//!
//! The loop is a plain state machine: it owns a status flag, its working
//! snapshot, and at most one armed timer handle. Real timers stay behind the
//! [`TickTimer`] port. The host arms wakeups through it and calls
//! [`ShowLoop::tick`] whenever one fires, so the loop itself never blocks,
//! spawns, or reads the clock.

use std::time::Duration;

use tracing::{debug, trace};

use crate::state::rng::RandomSource;
use crate::state::selectors::{is_current_player_finished, is_custom_round_finished};
use crate::state::show::{ShowState, ShowStatus};
use crate::state::transitions::{next_player, next_round, tick_custom_one_by_one};

/// Default pause between reveal ticks, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 300;

/// [`DEFAULT_TICK_INTERVAL_MS`] as a [`Duration`].
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS);

/// Lifecycle of a [`ShowLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopStatus {
    /// Constructed, never started.
    #[default]
    Idle,
    /// Ticking on the configured interval.
    Running,
    /// Suspended; [`ShowLoop::resume`] picks up where it left off.
    Paused,
    /// Halted by [`ShowLoop::stop`] or by the show finishing.
    Stopped,
}

impl LoopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopStatus::Idle => "idle",
            LoopStatus::Running => "running",
            LoopStatus::Paused => "paused",
            LoopStatus::Stopped => "stopped",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, LoopStatus::Running)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, LoopStatus::Paused)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, LoopStatus::Stopped)
    }
}

/// Tuning knobs for a [`ShowLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    /// Pause between reveal ticks.
    pub tick_interval: Duration,
    /// Advance to the next round automatically once the current round's
    /// reveal completes. When off, the loop keeps ticking quietly and the
    /// host decides when to move on.
    pub auto_next_round: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            auto_next_round: false,
        }
    }
}

/// Opaque token for an armed wakeup, minted by a [`TickTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(pub u64);

/// Timer port consumed by the loop.
///
/// `schedule` arms a single wakeup after `delay`; the host calls
/// [`ShowLoop::tick`] when it fires. Cancelling a handle that already fired
/// must be a no-op so the loop can cancel defensively.
pub trait TickTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// In-memory [`TickTimer`] for tests and hosts that drive time themselves.
///
/// Armed wakeups are recorded, never fired automatically; the owner calls
/// [`ManualTimer::fire`] to consume one.
#[derive(Debug, Default)]
pub struct ManualTimer {
    next_handle: u64,
    armed: Vec<(TimerHandle, Duration)>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently armed wakeups.
    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Delay of the oldest armed wakeup, if any.
    pub fn next_delay(&self) -> Option<Duration> {
        self.armed.first().map(|(_, delay)| *delay)
    }

    /// Consume the oldest armed wakeup, as a real timer would when it fires.
    pub fn fire(&mut self) -> Option<TimerHandle> {
        if self.armed.is_empty() {
            return None;
        }
        let (handle, _) = self.armed.remove(0);
        Some(handle)
    }
}

impl TickTimer for ManualTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.armed.push((handle, delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.armed.retain(|(armed, _)| *armed != handle);
    }
}

/// What a single [`ShowLoop::tick`] did.
///
/// The advanced snapshot itself is read through [`ShowLoop::state`]; the
/// outcome carries the edges a host reacts to. `round_finished` repeats on
/// every tick while a completed round sits unadvanced, so hosts treat it as
/// level-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The working snapshot changed this tick.
    pub state_changed: bool,
    /// The current round's reveal is complete.
    pub round_finished: bool,
    /// The whole show finished and the loop stopped itself.
    pub show_finished: bool,
}

impl TickOutcome {
    /// True when the tick had nothing to report.
    pub fn is_quiet(&self) -> bool {
        !self.state_changed && !self.round_finished && !self.show_finished
    }
}

/// Timer-driven reveal loop over a [`ShowState`] snapshot.
///
/// The loop works on its own copy of the state; the host reads the advanced
/// snapshot back after each tick and pushes external updates in through
/// [`ShowLoop::sync_state`].
#[derive(Debug)]
pub struct ShowLoop {
    status: LoopStatus,
    state: ShowState,
    options: LoopOptions,
    pending: Option<TimerHandle>,
}

impl ShowLoop {
    pub fn new(state: ShowState, options: LoopOptions) -> Self {
        Self {
            status: LoopStatus::Idle,
            state,
            options,
            pending: None,
        }
    }

    pub fn status(&self) -> LoopStatus {
        self.status
    }

    /// The loop's working snapshot.
    pub fn state(&self) -> &ShowState {
        &self.state
    }

    pub fn tick_interval(&self) -> Duration {
        self.options.tick_interval
    }

    /// Replace the working snapshot with one the host changed out-of-band.
    pub fn sync_state(&mut self, state: ShowState) {
        self.state = state;
    }

    /// Begin ticking. No-op while already running; from any other status
    /// (including stopped) this arms the first wakeup.
    pub fn start(&mut self, timer: &mut dyn TickTimer) {
        if self.status.is_running() {
            return;
        }
        self.status = LoopStatus::Running;
        self.arm(timer);
    }

    /// Suspend ticking without losing reveal progress.
    pub fn pause(&mut self, timer: &mut dyn TickTimer) {
        if !self.status.is_running() {
            return;
        }
        self.disarm(timer);
        self.status = LoopStatus::Paused;
    }

    /// Continue after [`ShowLoop::pause`].
    pub fn resume(&mut self, timer: &mut dyn TickTimer) {
        if !self.status.is_paused() {
            return;
        }
        self.status = LoopStatus::Running;
        self.arm(timer);
    }

    /// Halt the loop and cancel any armed wakeup.
    pub fn stop(&mut self, timer: &mut dyn TickTimer) {
        self.disarm(timer);
        self.status = LoopStatus::Stopped;
    }

    /// Change the tick interval; a running loop re-arms at the new pace
    /// without losing progress.
    pub fn set_tick_interval(&mut self, timer: &mut dyn TickTimer, interval: Duration) {
        self.options.tick_interval = interval;
        if self.status.is_running() {
            self.disarm(timer);
            self.arm(timer);
        }
    }

    /// Run one reveal step.
    ///
    /// Advances the current player's score one randomized step, moves the
    /// reveal cursor when that player reaches their target, and (with
    /// `auto_next_round`) rolls into the next round once the round's reveal
    /// completes. Re-arms the timer unless the show finished or the loop is
    /// not running.
    pub fn tick(&mut self, timer: &mut dyn TickTimer, rng: &mut dyn RandomSource) -> TickOutcome {
        if !self.status.is_running() {
            return TickOutcome::default();
        }
        // The armed wakeup fired (or the host ticked by hand); either way
        // only the wakeup armed below may remain.
        self.disarm(timer);

        let mut outcome = TickOutcome::default();

        let ticked = tick_custom_one_by_one(&self.state, rng);
        if ticked != self.state {
            self.state = ticked;
            outcome.state_changed = true;
        }

        if is_current_player_finished(&self.state) {
            let advanced = next_player(&self.state);
            if advanced != self.state {
                self.state = advanced;
                outcome.state_changed = true;
            }
        }

        if is_custom_round_finished(&self.state) {
            outcome.round_finished = true;
            if outcome.state_changed {
                debug!(
                    round = ?self.state.current_round_index,
                    "round reveal complete"
                );
            }
            if self.options.auto_next_round {
                self.state = next_round(&self.state);
                outcome.state_changed = true;
                if self.state.status == ShowStatus::Finished {
                    outcome.show_finished = true;
                    debug!("show reveal complete");
                    self.stop(timer);
                    return outcome;
                }
            }
        }

        trace!(
            state_changed = outcome.state_changed,
            round_finished = outcome.round_finished,
            "tick"
        );
        self.arm(timer);
        outcome
    }

    fn arm(&mut self, timer: &mut dyn TickTimer) {
        self.pending = Some(timer.schedule(self.options.tick_interval));
    }

    fn disarm(&mut self, timer: &mut dyn TickTimer) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
    }
}
