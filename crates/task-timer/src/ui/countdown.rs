//! Live countdown rendering.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::{Phase, ProgressSink, Tick};

const BAR_TEMPLATE: &str = "{prefix:.bold} [{bar:40.cyan/blue}] {msg}";

/// Renders ticks as a progress bar and asks before starting a break.
pub struct CountdownDisplay {
    label: String,
    assume_yes: bool,
    bar: Option<(Phase, ProgressBar)>,
}

impl CountdownDisplay {
    /// `label` names the work being timed. With `assume_yes` every break is
    /// accepted without a prompt.
    pub fn new(label: impl Into<String>, assume_yes: bool) -> Self {
        Self {
            label: label.into(),
            assume_yes,
            bar: None,
        }
    }

    fn bar_for(&mut self, tick: &Tick) -> &ProgressBar {
        if self.bar.as_ref().is_some_and(|(phase, _)| *phase != tick.phase) {
            self.bar = None;
        }
        let label = &self.label;
        let (_, bar) = self
            .bar
            .get_or_insert_with(|| (tick.phase, new_bar(label, tick)));
        bar
    }
}

fn new_bar(label: &str, tick: &Tick) -> ProgressBar {
    let bar = ProgressBar::new(tick.total_secs);
    bar.set_style(
        ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.set_prefix(match tick.phase {
        Phase::Work => label.to_string(),
        Phase::Break => "Break".to_string(),
    });
    bar
}

/// `mm:ss`, or `h:mm:ss` past the hour
pub fn format_remaining(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

impl ProgressSink for CountdownDisplay {
    fn on_tick(&mut self, tick: &Tick) {
        let bar = self.bar_for(tick);
        bar.set_position(tick.elapsed_secs());
        bar.set_message(format!("{} remaining", format_remaining(tick.remaining_secs)));
    }

    fn on_phase_end(&mut self, phase: Phase, completed: bool) {
        let Some((_, bar)) = self.bar.take() else {
            return;
        };
        match (phase, completed) {
            (Phase::Work, true) => bar.finish_with_message("Time's up!"),
            (Phase::Break, true) => bar.finish_with_message("Break over"),
            (_, false) => bar.abandon_with_message("Cancelled"),
        }
    }

    fn begin_break(&mut self, minutes: u32) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Start {minutes}-minute break?"))
            .default(true)
            .interact()
            .unwrap_or(false)
    }
}
