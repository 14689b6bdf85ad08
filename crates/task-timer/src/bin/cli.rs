//! Task Timer CLI - Pomodoro countdowns against tracked tasks.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::disallowed_macros)]
#![allow(clippy::uninlined_format_args)]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use notify::{DisabledNotifier, Notifier, SoundNotifier};
use tokio_util::sync::CancellationToken;

use task_timer::domain::{export, stats};
use task_timer::entities::{default_config_path, expand_home};
use task_timer::errors::TimerResult;
use task_timer::ui::{self, CountdownDisplay};
use task_timer::{
    BreakOutcome, ConfigKey, ConfigManager, EffectiveConfig, ExportFormat, Overrides,
    StartOptions, TaskStore, TaskTimer, TimerState,
};

#[derive(Parser)]
#[command(name = "task-timer")]
#[command(about = "Pomodoro timer with task tracking and tag statistics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(long, global = true, env = "TASK_TIMER_CONFIG")]
    config: Option<PathBuf>,

    /// Task data file, overriding the configured one
    #[arg(long, global = true, env = "TASK_TIMER_DATA_FILE")]
    data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name
        name: String,

        /// Duration in minutes (defaults to the configured duration)
        duration: Option<u32>,

        /// Tags for the task
        #[arg(short, long = "tag", num_args = 1..)]
        tags: Vec<String>,
    },

    /// List tasks
    List {
        /// Only tasks carrying this tag
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show details of a specific task
    Show {
        /// Task ID
        id: u64,
    },

    /// Run a countdown against a task
    Start {
        /// Task ID
        id: u64,

        /// Take a break afterwards (minutes, defaults to the configured break)
        #[arg(long = "break", value_name = "MINUTES")]
        break_minutes: Option<Option<u32>>,

        /// No completion sound
        #[arg(short, long)]
        silent: bool,

        /// Start the break without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: u64,
    },

    /// Show completion and time statistics
    Stats {
        /// Only tasks carrying this tag
        #[arg(short, long)]
        filter: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export all tasks to a file
    Export {
        /// Output file
        #[arg(short, long, default_value = "task_timer_export.csv")]
        output: PathBuf,

        /// Output format (csv, json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show every setting
    Show,

    /// Write the default configuration file if none exists
    Init,

    /// Print one setting
    Get {
        /// Setting name
        key: ConfigKey,
    },

    /// Change one setting
    Set {
        /// Setting name
        key: ConfigKey,

        /// New value
        value: String,
    },

    /// Restore built-in defaults
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        ui::print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> TimerResult<()> {
    let config_path = cli
        .config
        .map_or_else(default_config_path, |p| expand_home(&p.to_string_lossy()));
    let (mut config, _fallbacks) = ConfigManager::load(&config_path).await;

    let silent = matches!(cli.command, Commands::Start { silent: true, .. });
    let overrides = Overrides {
        data_file: cli
            .data_file
            .map(|p| expand_home(&p.to_string_lossy())),
        sound_enabled: silent.then_some(false),
        ..Overrides::default()
    };
    let effective = EffectiveConfig::resolve(config.show(), &overrides);

    match cli.command {
        Commands::Add {
            name,
            duration,
            tags,
        } => {
            let mut store = open_store(&effective).await;
            let duration = duration.unwrap_or(effective.default_duration());
            let task = store.add(&name, duration, &tags).await?;
            ui::print_success(&format!(
                "Added task {} '{}' ({} min)",
                task.id, task.name, task.duration_minutes
            ));
        }

        Commands::List { filter } => {
            let store = open_store(&effective).await;
            let tasks: Vec<_> = store.list(filter.as_deref()).collect();
            if tasks.is_empty() {
                match filter {
                    Some(tag) => ui::print_info(&format!("No tasks tagged '{tag}'")),
                    None => ui::print_info("No tasks yet. Add one with 'task-timer add <name>'"),
                }
            } else {
                println!("{}", ui::task_table(tasks));
            }
        }

        Commands::Show { id } => {
            let store = open_store(&effective).await;
            ui::display_task_details(store.get(id)?);
        }

        Commands::Start {
            id,
            break_minutes,
            silent,
            yes,
        } => {
            let mut store = open_store(&effective).await;
            let notifier: Arc<dyn Notifier> = if effective.sound_enabled() {
                Arc::new(SoundNotifier::platform_default())
            } else {
                Arc::new(DisabledNotifier)
            };
            let options = StartOptions {
                duration_minutes: None,
                silent,
                break_minutes: break_minutes.map(|m| m.unwrap_or(effective.default_break())),
            };

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let name = store.get(id)?.name.clone();
            let mut display = CountdownDisplay::new(name.clone(), yes);
            let mut timer = TaskTimer::new(effective, notifier);
            let outcome = timer
                .start(&mut store, id, options, &cancel, &mut display)
                .await?;

            match outcome.state {
                TimerState::Completed => ui::print_success(&format!(
                    "Completed '{}' ({} min recorded)",
                    name, outcome.task.time_spent_minutes
                )),
                _ => ui::print_warning(&format!("Timer for '{name}' cancelled, no time recorded")),
            }
            match outcome.break_outcome {
                Some(BreakOutcome::Completed) => ui::print_success("Break over, back to work"),
                Some(BreakOutcome::Cancelled) => ui::print_info("Break cut short"),
                Some(BreakOutcome::Skipped) | None => {}
            }
        }

        Commands::Delete { id } => {
            let mut store = open_store(&effective).await;
            let task = store.delete(id).await?;
            ui::print_success(&format!("Deleted task {} '{}'", task.id, task.name));
        }

        Commands::Stats { filter, json } => {
            let store = open_store(&effective).await;
            let report = stats::compute(store.snapshot(), filter.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.total == 0 {
                ui::print_info("No tasks to report on");
            } else {
                ui::display_stats(&report);
            }
        }

        Commands::Export { output, format } => {
            let store = open_store(&effective).await;
            let file = File::create(&output).map_err(|e| task_timer::TimerError::FileWriteError {
                path: output.display().to_string(),
                reason: e.to_string(),
            })?;
            export::write(store.snapshot(), format, BufWriter::new(file))?;
            ui::print_success(&format!(
                "Exported {} tasks to {}",
                store.len(),
                output.display().to_string().cyan()
            ));
        }

        Commands::Config { action } => {
            run_config(&mut config, action.unwrap_or(ConfigAction::Show)).await?;
        }
    }

    Ok(())
}

/// Open the data file, reporting any recovery that happened on the way.
async fn open_store(config: &EffectiveConfig) -> TaskStore {
    let (store, warning) = TaskStore::open_file(config).await;
    if let Some(warning) = warning {
        ui::print_warning(&warning.error.to_string());
        match warning.backup {
            Some(backup) => ui::print_info(&format!("Previous data saved to {backup}")),
            None => ui::print_warning("Changes will not be saved until the data file is fixed"),
        }
    }
    store
}

async fn run_config(config: &mut ConfigManager, action: ConfigAction) -> TimerResult<()> {
    match action {
        ConfigAction::Show => {
            ui::print_info(&format!("Config file: {}", config.path().display()));
            ui::display_config(config.show());
        }

        ConfigAction::Init => {
            if config.init().await? {
                ui::print_success(&format!("Created {}", config.path().display()));
            } else {
                ui::print_warning(&format!("{} already exists", config.path().display()));
            }
        }

        ConfigAction::Get { key } => println!("{}", config.get(key)),

        ConfigAction::Set { key, value } => {
            config.set(key, &value).await?;
            ui::print_success(&format!("{key} = {}", config.get(key)));
        }

        ConfigAction::Reset => {
            config.reset().await?;
            ui::print_success("Configuration reset to defaults");
        }
    }

    Ok(())
}
