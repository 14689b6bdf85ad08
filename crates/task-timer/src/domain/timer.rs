//! Countdown engine.
//!
//! A timer runs one work countdown against a task, optionally followed by a
//! break countdown. The countdown is a cooperative loop: it awaits one tick,
//! then polls the cancellation token. Nothing else interrupts it.
//!
//! ```text
//! Idle -> Running -> Completed
//!                 \-> Cancelled
//! ```

use std::sync::Arc;
use std::time::Duration;

use notify::Notifier;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::store::TaskStore;
use crate::entities::{validate_duration, EffectiveConfig, Task, MAX_BREAK_MINUTES};
use crate::errors::{TimerError, TimerResult};

/// Wall-clock length of one countdown second.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Shortest tick accepted; `tokio::time::interval` rejects a zero period.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Upper bound on a completion cue.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Timer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Which countdown a tick belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

/// Progress signal emitted once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub total_secs: u64,
}

impl Tick {
    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs - self.remaining_secs
    }
}

/// How the break countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    Completed,
    Cancelled,
    /// The sink declined the break
    Skipped,
}

/// Receives countdown progress.
///
/// Any `FnMut(&Tick)` closure is a sink that renders ticks and accepts every
/// break.
pub trait ProgressSink {
    fn on_tick(&mut self, tick: &Tick);

    /// Called when a countdown ends, with `completed == false` on cancellation.
    fn on_phase_end(&mut self, _phase: Phase, _completed: bool) {}

    /// Asked after a completed work countdown when a break was requested.
    fn begin_break(&mut self, _minutes: u32) -> bool {
        true
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(&Tick),
{
    fn on_tick(&mut self, tick: &Tick) {
        self(tick);
    }
}

/// Options for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct StartOptions {
    /// Overrides the task's own duration
    pub duration_minutes: Option<u32>,
    /// Suppress the completion cue regardless of configuration
    pub silent: bool,
    /// Run a break countdown of this length after a completed work countdown
    pub break_minutes: Option<u32>,
}

/// Result of a run
#[derive(Debug, Clone)]
pub struct TimerOutcome {
    pub state: TimerState,
    /// The task as it stands after the run
    pub task: Task,
    pub break_outcome: Option<BreakOutcome>,
}

/// Runs countdowns against tasks
pub struct TaskTimer {
    config: EffectiveConfig,
    notifier: Arc<dyn Notifier>,
    tick: Duration,
    notify_timeout: Duration,
    state: TimerState,
}

impl TaskTimer {
    /// Create a timer using the given configuration and cue backend
    pub fn new(config: EffectiveConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            notifier,
            tick: DEFAULT_TICK,
            notify_timeout: NOTIFY_TIMEOUT,
            state: TimerState::Idle,
        }
    }

    /// Change the wall-clock length of a tick. One tick is always one
    /// countdown second. Ticks shorter than a millisecond are raised to one.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(MIN_TICK);
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Run a countdown against task `id`.
    ///
    /// Blocks the caller for the whole countdown. On completion the task is
    /// marked completed with the countdown length as time spent; on
    /// cancellation it is left untouched.
    pub async fn start<S>(
        &mut self,
        store: &mut TaskStore,
        id: u64,
        options: StartOptions,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> TimerResult<TimerOutcome>
    where
        S: ProgressSink + ?Sized,
    {
        let task = store.get(id)?.clone();
        if task.is_completed() {
            return Err(TimerError::AlreadyCompleted { id });
        }

        let minutes = validate_duration(options.duration_minutes.unwrap_or(task.duration_minutes))?;
        if let Some(break_minutes) = options.break_minutes {
            if break_minutes == 0 || break_minutes > MAX_BREAK_MINUTES {
                return Err(TimerError::invalid(format!(
                    "break must be between 1 and {MAX_BREAK_MINUTES} minutes, got {break_minutes}"
                )));
            }
        }

        self.state = TimerState::Running;
        info!(id, minutes, "Timer started");

        let finished = self.countdown(Phase::Work, minutes, cancel, sink).await;
        sink.on_phase_end(Phase::Work, finished);

        if !finished {
            self.state = TimerState::Cancelled;
            info!(id, "Timer cancelled, no time recorded");
            return Ok(TimerOutcome {
                state: self.state,
                task,
                break_outcome: None,
            });
        }

        let task = match store.complete(id, minutes).await {
            Ok(task) => task,
            Err(e) => {
                self.state = TimerState::Idle;
                return Err(e);
            }
        };
        self.state = TimerState::Completed;
        self.cue(options.silent).await;

        let break_outcome = match options.break_minutes {
            Some(break_minutes) => Some(self.run_break(break_minutes, options.silent, cancel, sink).await),
            None => None,
        };

        Ok(TimerOutcome {
            state: self.state,
            task,
            break_outcome,
        })
    }

    async fn run_break<S>(
        &self,
        minutes: u32,
        silent: bool,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> BreakOutcome
    where
        S: ProgressSink + ?Sized,
    {
        // A cancel that landed in the final work second did not stop the work
        // countdown, but it still means stop: no prompt and no break.
        if cancel.is_cancelled() {
            info!("Interrupted as work finished, break not started");
            return BreakOutcome::Cancelled;
        }
        if !sink.begin_break(minutes) {
            debug!("Break skipped");
            return BreakOutcome::Skipped;
        }

        info!(minutes, "Break started");
        let finished = self.countdown(Phase::Break, minutes, cancel, sink).await;
        sink.on_phase_end(Phase::Break, finished);

        if finished {
            self.cue(silent).await;
            BreakOutcome::Completed
        } else {
            info!("Break cancelled");
            BreakOutcome::Cancelled
        }
    }

    /// Count `minutes` down one tick at a time. Returns `false` if cancelled.
    async fn countdown<S>(
        &self,
        phase: Phase,
        minutes: u32,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> bool
    where
        S: ProgressSink + ?Sized,
    {
        let total_secs = u64::from(minutes) * 60;
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick of an interval fires immediately
        interval.tick().await;

        sink.on_tick(&Tick {
            phase,
            remaining_secs: total_secs,
            total_secs,
        });

        for elapsed in 1..=total_secs {
            interval.tick().await;
            if elapsed < total_secs && cancel.is_cancelled() {
                debug!(?phase, elapsed, "Cancellation observed at tick boundary");
                return false;
            }
            trace!(?phase, elapsed, "Tick");
            sink.on_tick(&Tick {
                phase,
                remaining_secs: total_secs - elapsed,
                total_secs,
            });
        }
        true
    }

    /// Best-effort completion cue. Never fails the caller.
    async fn cue(&self, silent: bool) {
        if silent || !self.config.sound_enabled() {
            debug!(silent, "Completion cue suppressed");
            return;
        }

        let sound = self.config.sound_file();
        match tokio::time::timeout(self.notify_timeout, self.notifier.notify(sound)).await {
            Ok(Ok(())) => debug!(notifier = self.notifier.name(), "Completion cue played"),
            Ok(Err(e)) => warn!(
                notifier = self.notifier.name(),
                error = %TimerError::from(e),
                "Completion cue failed"
            ),
            Err(_) => warn!(
                notifier = self.notifier.name(),
                timeout_ms = u64::try_from(self.notify_timeout.as_millis()).unwrap_or(u64::MAX),
                "Completion cue timed out"
            ),
        }
    }
}
