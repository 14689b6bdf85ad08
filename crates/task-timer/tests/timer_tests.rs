//! Integration tests for the countdown engine.
//!
//! Every timer here runs with a 1 ms tick, so a one-minute countdown takes
//! about 60 ms of wall time.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use notify::{Notifier, NotifyError};
use task_timer::{
    BreakOutcome, Config, EffectiveConfig, ErrorKind, FileStorage, Overrides, Phase,
    ProgressSink, StartOptions, TaskStatus, TaskStore, TaskTimer, Tick, TimerState,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(1);

/// Records every cue request and optionally fails it
#[derive(Default)]
struct RecordingNotifier {
    played: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn played(&self) -> Vec<PathBuf> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, sound: &Path) -> Result<(), NotifyError> {
        self.played.lock().unwrap().push(sound.to_path_buf());
        if self.fail {
            return Err(NotifyError::NoPlayer {
                tried: "none".to_string(),
            });
        }
        Ok(())
    }
}

struct Fixture {
    _temp: TempDir,
    store: TaskStore,
    config: EffectiveConfig,
}

async fn fixture(overrides: Overrides) -> Fixture {
    let temp = TempDir::new().unwrap();
    let overrides = Overrides {
        data_file: Some(temp.path().join("tasks.json")),
        sound_file: Some(temp.path().join("ding.wav")),
        ..overrides
    };
    let config = EffectiveConfig::resolve(&Config::default(), &overrides);
    let (store, _) = TaskStore::open(Arc::new(FileStorage::new(config.data_file()))).await;
    Fixture {
        _temp: temp,
        store,
        config,
    }
}

mod work_phase {
    use super::*;

    #[tokio::test]
    async fn test_completion_credits_full_duration() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Essay", 2, ["writing"]).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut timer = TaskTimer::new(fx.config.clone(), notifier.clone()).with_tick(TICK);
        assert_eq!(timer.state(), TimerState::Idle);

        let mut last = None;
        let outcome = timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions::default(),
                &CancellationToken::new(),
                &mut |t: &Tick| last = Some(*t),
            )
            .await
            .unwrap();

        assert_eq!(outcome.state, TimerState::Completed);
        assert_eq!(outcome.task.time_spent_minutes, 2);
        assert!(outcome.task.completed_at.is_some());
        assert_eq!(last.map(|t| (t.remaining_secs, t.total_secs)), Some((0, 120)));
        assert_eq!(notifier.played(), vec![fx.config.sound_file().to_path_buf()]);

        // the credit is on disk, not only in memory
        let (reopened, _) =
            TaskStore::open(Arc::new(FileStorage::new(fx.config.data_file()))).await;
        assert_eq!(reopened.get(task.id).unwrap().status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_duration_override_is_what_gets_credited() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Short", 25, Vec::<String>::new()).await.unwrap();
        let mut timer = TaskTimer::new(fx.config.clone(), Arc::new(RecordingNotifier::default()))
            .with_tick(TICK);

        let outcome = timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions {
                    duration_minutes: Some(1),
                    ..StartOptions::default()
                },
                &CancellationToken::new(),
                &mut |_: &Tick| {},
            )
            .await
            .unwrap();

        assert_eq!(outcome.task.time_spent_minutes, 1);
        assert_eq!(outcome.task.duration_minutes, 25);
    }

    #[tokio::test]
    async fn test_cancellation_at_tick_k_changes_nothing() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Interrupted", 1, Vec::<String>::new()).await.unwrap();
        let before = fx.store.get(task.id).unwrap().clone();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut timer = TaskTimer::new(fx.config.clone(), notifier.clone()).with_tick(TICK);

        let cancel = CancellationToken::new();
        let signal = cancel.clone();
        let mut work_ticks = 0;
        let outcome = timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions::default(),
                &cancel,
                &mut |t: &Tick| {
                    work_ticks += 1;
                    if t.elapsed_secs() == 30 {
                        signal.cancel();
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.state, TimerState::Cancelled);
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert_eq!(work_ticks, 31);
        assert_eq!(fx.store.get(task.id).unwrap(), &before);
        assert!(notifier.played().is_empty());
    }

    #[tokio::test]
    async fn test_failing_notifier_is_only_a_warning() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Loud", 1, Vec::<String>::new()).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::failing());
        let mut timer = TaskTimer::new(fx.config.clone(), notifier.clone()).with_tick(TICK);

        let outcome = timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions::default(),
                &CancellationToken::new(),
                &mut |_: &Tick| {},
            )
            .await
            .unwrap();

        assert_eq!(outcome.state, TimerState::Completed);
        assert_eq!(notifier.played().len(), 1);
        assert!(fx.store.get(task.id).unwrap().is_completed());
    }

    #[tokio::test]
    async fn test_sound_disabled_in_config_suppresses_cue() {
        let mut fx = fixture(Overrides {
            sound_enabled: Some(false),
            ..Overrides::default()
        })
        .await;
        let task = fx.store.add("Quiet", 1, Vec::<String>::new()).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut timer = TaskTimer::new(fx.config.clone(), notifier.clone()).with_tick(TICK);

        timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions::default(),
                &CancellationToken::new(),
                &mut |_: &Tick| {},
            )
            .await
            .unwrap();

        assert!(notifier.played().is_empty());
    }

    #[tokio::test]
    async fn test_errors_are_classified() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Done", 1, Vec::<String>::new()).await.unwrap();
        fx.store.complete(task.id, 1).await.unwrap();
        let mut timer = TaskTimer::new(fx.config.clone(), Arc::new(RecordingNotifier::default()))
            .with_tick(TICK);
        let cancel = CancellationToken::new();

        let err = timer
            .start(&mut fx.store, 7, StartOptions::default(), &cancel, &mut |_: &Tick| {})
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = timer
            .start(&mut fx.store, task.id, StartOptions::default(), &cancel, &mut |_: &Tick| {})
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}

mod break_phase {
    use super::*;

    #[tokio::test]
    async fn test_break_follows_work_and_leaves_task_alone() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Sprint", 1, Vec::<String>::new()).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut timer = TaskTimer::new(fx.config.clone(), notifier.clone()).with_tick(TICK);

        let mut break_ticks = 0;
        let outcome = timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions {
                    break_minutes: Some(1),
                    ..StartOptions::default()
                },
                &CancellationToken::new(),
                &mut |t: &Tick| {
                    if t.phase == Phase::Break {
                        break_ticks += 1;
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(break_ticks, 61);
        assert_eq!(outcome.state, TimerState::Completed);
        assert_eq!(fx.store.get(task.id).unwrap().time_spent_minutes, 1);
        // one cue for the work countdown, one for the break
        assert_eq!(notifier.played().len(), 2);
    }

    /// Counts break ticks and break prompts
    #[derive(Default)]
    struct BreakWatcher {
        cancel_at_last_work_tick: Option<CancellationToken>,
        prompts: usize,
        break_ticks: usize,
    }

    impl ProgressSink for BreakWatcher {
        fn on_tick(&mut self, tick: &Tick) {
            match tick.phase {
                Phase::Work if tick.remaining_secs == 0 => {
                    if let Some(cancel) = &self.cancel_at_last_work_tick {
                        cancel.cancel();
                    }
                }
                Phase::Work => {}
                Phase::Break => self.break_ticks += 1,
            }
        }

        fn begin_break(&mut self, _minutes: u32) -> bool {
            self.prompts += 1;
            true
        }
    }

    #[tokio::test]
    async fn test_interrupt_in_final_work_second_skips_break() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Last second", 1, Vec::<String>::new()).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut timer = TaskTimer::new(fx.config.clone(), notifier.clone()).with_tick(TICK);

        let cancel = CancellationToken::new();
        let mut watcher = BreakWatcher {
            cancel_at_last_work_tick: Some(cancel.clone()),
            ..BreakWatcher::default()
        };
        let outcome = timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions {
                    break_minutes: Some(1),
                    ..StartOptions::default()
                },
                &cancel,
                &mut watcher,
            )
            .await
            .unwrap();

        // the work countdown still completes and is credited
        assert_eq!(outcome.state, TimerState::Completed);
        assert!(fx.store.get(task.id).unwrap().is_completed());
        // the break never starts: no prompt, no ticks, no break cue
        assert_eq!(outcome.break_outcome, Some(BreakOutcome::Cancelled));
        assert_eq!(watcher.prompts, 0);
        assert_eq!(watcher.break_ticks, 0);
        assert_eq!(notifier.played().len(), 1);
    }

    #[tokio::test]
    async fn test_silent_run_keeps_break_quiet_too() {
        let mut fx = fixture(Overrides::default()).await;
        let task = fx.store.add("Hush", 1, Vec::<String>::new()).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut timer = TaskTimer::new(fx.config.clone(), notifier.clone()).with_tick(TICK);

        timer
            .start(
                &mut fx.store,
                task.id,
                StartOptions {
                    silent: true,
                    break_minutes: Some(1),
                    ..StartOptions::default()
                },
                &CancellationToken::new(),
                &mut |_: &Tick| {},
            )
            .await
            .unwrap();

        assert!(notifier.played().is_empty());
    }
}
